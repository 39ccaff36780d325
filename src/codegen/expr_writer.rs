//! Emission of receiver expressions captured by bound method references

use crate::ast::{Expr, Literal, TypeEnum};
use crate::codegen::code::{Code, Type};
use crate::codegen::constpool::ConstantPool;
use crate::codegen::descriptor;
use crate::codegen::error::BytecodeError;
use crate::codegen::opcodes;
use crate::common::consts;
use crate::common::error::Result;

/// Writes an expression's value onto the operand stack
pub trait ExpressionEmitter {
    fn emit_expression(&mut self, expr: &Expr, code: &mut Code, pool: &mut ConstantPool) -> Result<()>;
}

/// Default emitter for the receiver shapes a type checker hands to this stage
#[derive(Debug, Default)]
pub struct ExprWriter;

impl ExprWriter {
    pub fn new() -> Self {
        Self
    }

    fn emit_literal(&self, literal: &Literal, code: &mut Code, pool: &mut ConstantPool) -> Result<()> {
        match literal {
            Literal::Integer(value) => match *value {
                v @ -1..=5 => {
                    code.emitop((opcodes::ICONST_0 as i32 + v) as u8);
                    code.push(Type::Int);
                }
                v if i8::try_from(v).is_ok() => {
                    code.emitop1(opcodes::BIPUSH, v as i8 as u8);
                    code.push(Type::Int);
                }
                v if i16::try_from(v).is_ok() => {
                    code.emitop2(opcodes::SIPUSH, v as i16 as u16);
                    code.push(Type::Int);
                }
                v => {
                    let index = pool.add_integer(v)?;
                    code.emit_ldc(index, Type::Int);
                }
            },
            Literal::String(value) => {
                let index = pool.add_string(value)?;
                code.emit_ldc(index, Type::Object(consts::JAVA_LANG_STRING.to_string()));
            }
            Literal::Null => {
                code.emitop(opcodes::ACONST_NULL);
                code.push(Type::Null);
            }
        }
        Ok(())
    }
}

impl ExpressionEmitter for ExprWriter {
    fn emit_expression(&mut self, expr: &Expr, code: &mut Code, pool: &mut ConstantPool) -> Result<()> {
        match expr {
            Expr::This(this) => code.emit_load(&this.ty, 0)?,
            Expr::Local(local) => code.emit_load(&local.ty, local.slot)?,
            Expr::Literal(literal) => self.emit_literal(&literal.value, code, pool)?,
            Expr::FieldAccess(field) => {
                let field_descriptor = descriptor::type_to_descriptor(&field.ty);
                let index = pool.add_field_ref(&field.owner, &field.name, &field_descriptor)?;
                match &field.target {
                    Some(target) => {
                        self.emit_expression(target, code, pool)?;
                        code.emitop2(opcodes::GETFIELD, index);
                        code.pop(1)?;
                    }
                    None => code.emitop2(opcodes::GETSTATIC, index),
                }
                match Type::of(&field.ty) {
                    Some(t) => code.push(t),
                    None => {
                        return Err(BytecodeError::UnsupportedExpression {
                            message: format!("field {}.{} of type void", field.owner, field.name),
                        }
                        .into())
                    }
                }
            }
            Expr::MethodCall(call) => {
                if call.return_type == TypeEnum::Void {
                    return Err(BytecodeError::UnsupportedExpression {
                        message: format!("receiver call {}.{} returns void", call.owner, call.name),
                    }
                    .into());
                }
                if call.arguments.len() != call.parameter_types.len() {
                    return Err(BytecodeError::UnsupportedExpression {
                        message: format!("call to {}.{} has mismatched argument count", call.owner, call.name),
                    }
                    .into());
                }
                if let Some(target) = &call.target {
                    self.emit_expression(target, code, pool)?;
                }
                for argument in &call.arguments {
                    self.emit_expression(argument, code, pool)?;
                }
                let method_descriptor = descriptor::method_descriptor(&call.parameter_types, &call.return_type);
                let index = if call.owner_is_interface {
                    pool.add_interface_method_ref(&call.owner, &call.name, &method_descriptor)?
                } else {
                    pool.add_method_ref(&call.owner, &call.name, &method_descriptor)?
                };
                let op = match (&call.target, call.owner_is_interface) {
                    (None, _) => opcodes::INVOKESTATIC,
                    (Some(_), true) => opcodes::INVOKEINTERFACE,
                    (Some(_), false) => opcodes::INVOKEVIRTUAL,
                };
                code.emit_invoke(op, index, &call.parameter_types, &call.return_type)?;
            }
        }
        Ok(())
    }
}
