//! Lowering configuration

use crate::codegen::opcodes::{JAVA_1_8, JAVA_21};
use crate::common::consts;
use crate::common::error::{Error, Result};

/// Bootstrap method used to link every method-reference call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            owner: consts::LAMBDA_METAFACTORY.to_string(),
            name: consts::METAFACTORY_NAME.to_string(),
            descriptor: consts::METAFACTORY_DESCRIPTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Class file major version of the generated code
    pub target_major_version: u16,
    /// Trace every emitted instruction at `trace` level
    pub debug_code: bool,
    pub bootstrap: BootstrapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_major_version: JAVA_1_8,
            debug_code: false,
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Config {
    pub fn with_target_version(mut self, major: u16) -> Self {
        self.target_major_version = major;
        self
    }

    pub fn with_debug_code(mut self, debug_code: bool) -> Self {
        self.debug_code = debug_code;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: BootstrapConfig) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// `invokedynamic` needs class file version 51+; method handles on
    /// interface methods need 52+
    pub fn validate(&self) -> Result<()> {
        if self.target_major_version < JAVA_1_8 || self.target_major_version > JAVA_21 {
            return Err(Error::Config {
                message: format!(
                    "unsupported class file version {} (expected {}..={})",
                    self.target_major_version, JAVA_1_8, JAVA_21
                ),
            });
        }
        if self.bootstrap.owner.is_empty() || self.bootstrap.name.is_empty() {
            return Err(Error::Config { message: "bootstrap method owner and name must be set".to_string() });
        }
        if !self.bootstrap.descriptor.starts_with('(') {
            return Err(Error::Config {
                message: format!("invalid bootstrap descriptor '{}'", self.bootstrap.descriptor),
            });
        }
        Ok(())
    }
}
