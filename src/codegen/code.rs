//! Code generation buffer with operand stack tracking
//!
//! A much reduced descendant of javac's Code.java: straight-line code only,
//! which is all a synthesized factory method or a call-site prologue needs.

use crate::ast::{PrimitiveType, TypeEnum};
use crate::codegen::descriptor;
use crate::codegen::error::{BytecodeError, BytecodeResult};
use crate::codegen::opcodes;

/// Simplified verification type of an operand stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Long,
    Double,
    Null,
    Object(String),
}

impl Type {
    /// Get the width of this type in stack slots
    pub fn width(&self) -> u16 {
        match self {
            Type::Long | Type::Double => 2,
            _ => 1,
        }
    }

    pub fn of(ty: &TypeEnum) -> Option<Type> {
        match ty {
            TypeEnum::Void => None,
            TypeEnum::Primitive(PrimitiveType::Long) => Some(Type::Long),
            TypeEnum::Primitive(PrimitiveType::Float) => Some(Type::Float),
            TypeEnum::Primitive(PrimitiveType::Double) => Some(Type::Double),
            TypeEnum::Primitive(_) => Some(Type::Int),
            TypeEnum::Reference(_) => Some(Type::Object(descriptor::class_constant_name(ty))),
        }
    }
}

/// Stack state tracking
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Current stack depth in slots
    pub stacksize: u16,
    /// Maximum stack depth seen
    pub max_stacksize: u16,
    pub stack: Vec<Type>,
}

impl State {
    pub fn push(&mut self, t: Type) {
        self.stacksize += t.width();
        self.max_stacksize = self.max_stacksize.max(self.stacksize);
        self.stack.push(t);
    }

    /// Pop `n` entries (not slots)
    pub fn pop(&mut self, n: usize) -> BytecodeResult<()> {
        for _ in 0..n {
            let item = self.stack.pop().ok_or(BytecodeError::StackUnderflow)?;
            self.stacksize -= item.width();
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Code {
    code: Vec<u8>,
    max_locals: u16,
    state: State,
    debug_code: bool,
}

impl Code {
    pub fn new(max_locals: u16, debug_code: bool) -> Self {
        Self { code: Vec::with_capacity(64), max_locals, state: State::default(), debug_code }
    }

    pub fn emit1(&mut self, od: u8) {
        self.code.push(od);
    }

    pub fn emit2(&mut self, od: u16) {
        self.code.extend_from_slice(&od.to_be_bytes());
    }

    pub fn emitop(&mut self, op: u8) {
        if self.debug_code {
            log::trace!("emit@{} stack={}: {}", self.code.len(), self.state.stacksize, opcodes::mnemonic(op));
        }
        self.emit1(op);
    }

    pub fn emitop1(&mut self, op: u8, od: u8) {
        self.emitop(op);
        self.emit1(od);
    }

    pub fn emitop2(&mut self, op: u8, od: u16) {
        self.emitop(op);
        self.emit2(od);
    }

    pub fn push(&mut self, t: Type) {
        self.state.push(t);
    }

    pub fn pop(&mut self, n: usize) -> BytecodeResult<()> {
        self.state.pop(n)
    }

    /// Reserve local slots beyond the ones passed to `new`
    pub fn reserve_locals(&mut self, slots: usize) -> BytecodeResult<()> {
        let slots = u16::try_from(slots).map_err(|_| BytecodeError::TooManyLocals { slots })?;
        self.max_locals = self.max_locals.max(slots);
        Ok(())
    }

    pub fn emit_load(&mut self, ty: &TypeEnum, slot: u16) -> BytecodeResult<()> {
        let (base, short_base) = match ty {
            TypeEnum::Primitive(PrimitiveType::Long) => (opcodes::LLOAD, opcodes::LLOAD_0),
            TypeEnum::Primitive(PrimitiveType::Float) => (opcodes::FLOAD, opcodes::FLOAD_0),
            TypeEnum::Primitive(PrimitiveType::Double) => (opcodes::DLOAD, opcodes::DLOAD_0),
            TypeEnum::Primitive(_) => (opcodes::ILOAD, opcodes::ILOAD_0),
            TypeEnum::Reference(_) => (opcodes::ALOAD, opcodes::ALOAD_0),
            TypeEnum::Void => {
                return Err(BytecodeError::UnsupportedExpression { message: "load of void".to_string() })
            }
        };
        match slot {
            0..=3 => self.emitop(short_base + slot as u8),
            4..=255 => self.emitop1(base, slot as u8),
            _ => return Err(BytecodeError::TooManyLocals { slots: slot as usize }),
        }
        if let Some(t) = Type::of(ty) {
            self.push(t);
        }
        Ok(())
    }

    pub fn emit_ldc(&mut self, index: u16, t: Type) {
        if index <= u8::MAX as u16 {
            self.emitop1(opcodes::LDC, index as u8);
        } else {
            self.emitop2(opcodes::LDC_W, index);
        }
        self.push(t);
    }

    /// invokevirtual / invokespecial / invokestatic / invokeinterface
    pub fn emit_invoke(&mut self, op: u8, index: u16, params: &[TypeEnum], ret: &TypeEnum) -> BytecodeResult<()> {
        self.emitop2(op, index);
        let has_receiver = op != opcodes::INVOKESTATIC;
        if op == opcodes::INVOKEINTERFACE {
            let slots: u16 = params.iter().map(TypeEnum::width).sum::<u16>() + 1;
            self.emit1(slots as u8);
            self.emit1(0);
        }
        self.pop(params.len() + usize::from(has_receiver))?;
        if let Some(t) = Type::of(ret) {
            self.push(t);
        }
        Ok(())
    }

    /// Pops the captured arguments and pushes the produced call-site value
    pub fn emit_invokedynamic(&mut self, index: u16, captured: usize, result: Type) -> BytecodeResult<()> {
        self.emitop2(opcodes::INVOKEDYNAMIC, index);
        self.emit2(0);
        self.pop(captured)?;
        self.push(result);
        Ok(())
    }

    pub fn emit_return(&mut self, ty: &TypeEnum) -> BytecodeResult<()> {
        let op = match ty {
            TypeEnum::Void => opcodes::RETURN,
            TypeEnum::Primitive(PrimitiveType::Long) => opcodes::LRETURN,
            TypeEnum::Primitive(PrimitiveType::Float) => opcodes::FRETURN,
            TypeEnum::Primitive(PrimitiveType::Double) => opcodes::DRETURN,
            TypeEnum::Primitive(_) => opcodes::IRETURN,
            TypeEnum::Reference(_) => opcodes::ARETURN,
        };
        self.emitop(op);
        self.pop(usize::from(*ty != TypeEnum::Void))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.code.clone()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.code
    }

    pub fn max_stack(&self) -> u16 {
        self.state.max_stacksize
    }

    pub fn max_locals(&self) -> u16 {
        self.max_locals
    }

    pub fn stack(&self) -> &[Type] {
        &self.state.stack
    }

    pub fn stack_depth(&self) -> u16 {
        self.state.stacksize
    }

    pub fn check_size(&self) -> BytecodeResult<()> {
        if self.code.len() > u16::MAX as usize {
            return Err(BytecodeError::CodeTooLarge);
        }
        Ok(())
    }
}
