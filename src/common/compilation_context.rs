//! Per-type and per-method generation state
//!
//! A `GeneratorContext` lives as long as code generation for one enclosing
//! type. Every `MethodContext` created from it shares its synthetic member
//! counter, so factory names stay unique across all methods of the type even
//! when several generator threads work on it at once.

use crate::common::consts;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct GeneratorContext {
    class_name: String,
    synthetic_index: Arc<AtomicU32>,
}

impl GeneratorContext {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self { class_name: class_name.into(), synthetic_index: Arc::new(AtomicU32::new(0)) }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Context for code emitted inside `method_name`, or at type level when `None`
    pub fn method_context(&self, method_name: Option<&str>) -> MethodContext {
        MethodContext {
            class_name: self.class_name.clone(),
            method_name: method_name.map(str::to_string),
            synthetic_index: Arc::clone(&self.synthetic_index),
        }
    }

    /// Synthetic members generated so far
    pub fn synthetic_count(&self) -> u32 {
        self.synthetic_index.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct MethodContext {
    class_name: String,
    method_name: Option<String>,
    synthetic_index: Arc<AtomicU32>,
}

impl MethodContext {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    /// `ctorRef$<method>$<n>`, or `ctorRef$<n>` outside any method. Angle
    /// brackets of `<init>`/`<clinit>` are dropped.
    pub fn next_constructor_reference_name(&self) -> String {
        let index = self.synthetic_index.fetch_add(1, Ordering::SeqCst);
        match &self.method_name {
            Some(method) => {
                let method: String = method.chars().filter(|c| *c != '<' && *c != '>').collect();
                format!("{}{}${}", consts::CTOR_REF_PREFIX, method, index)
            }
            None => format!("{}{}", consts::CTOR_REF_PREFIX, index),
        }
    }
}
