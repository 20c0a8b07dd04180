//! Template execution - evaluates parsed actions against a function registry

use crate::parser::ast::{Command, Operand, Pipeline, Segment, Spanned, Template, Value};

use super::registry::{ExecError, FunctionRegistry};

/// A template whose function names are all known to a registry
#[derive(Debug, Clone, Copy)]
pub struct BoundTemplate<'t, 'r> {
    template: &'t Template,
    registry: &'r FunctionRegistry,
}

/// Bind `template` to `registry`
///
/// Fails on the first function name the registry does not define, before
/// anything is evaluated.
pub fn bind<'t, 'r>(
    template: &'t Template,
    registry: &'r FunctionRegistry,
) -> Result<BoundTemplate<'t, 'r>, ExecError> {
    if let Some(unknown) = template
        .identifiers()
        .into_iter()
        .find(|id| !registry.contains(id.node.as_str()))
    {
        return Err(ExecError::UnknownFunction {
            name: unknown.node.0.clone(),
        });
    }
    Ok(BoundTemplate { template, registry })
}

impl BoundTemplate<'_, '_> {
    /// Render the template; the data context is empty, so `.` is `""`
    pub fn execute(&self) -> Result<String, ExecError> {
        let mut out = String::new();
        for segment in &self.template.segments {
            match &segment.node {
                Segment::Text(text) => out.push_str(text),
                Segment::Comment => {}
                Segment::Action(pipeline) => {
                    let value = self.eval_pipeline(pipeline)?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Ok(out)
    }

    fn eval_pipeline(&self, pipeline: &Pipeline) -> Result<Value, ExecError> {
        let mut piped = None;
        for command in &pipeline.commands {
            piped = Some(self.eval_command(command, piped.take())?);
        }
        // The grammar never produces an empty pipeline
        Ok(piped.unwrap_or_else(|| Value::Str(String::new())))
    }

    /// Evaluate one command; `piped` is the result of the previous command
    fn eval_command(
        &self,
        command: &Spanned<Command>,
        piped: Option<Value>,
    ) -> Result<Value, ExecError> {
        let Some((first, rest)) = command.node.operands.split_first() else {
            return Ok(Value::Str(String::new()));
        };

        match &first.node {
            Operand::Identifier(name) => {
                let mut args = rest
                    .iter()
                    .map(|arg| self.eval_arg(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                args.extend(piped);
                self.call(name.node.as_str(), &args)
            }
            _ if !rest.is_empty() || piped.is_some() => Err(ExecError::NotAFunction {
                found: describe(&first.node),
            }),
            _ => self.eval_arg(first),
        }
    }

    fn eval_arg(&self, operand: &Spanned<Operand>) -> Result<Value, ExecError> {
        match &operand.node {
            Operand::Identifier(name) => self.call(name.node.as_str(), &[]),
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Dot => Ok(Value::Str(String::new())),
            Operand::Field(field) => Err(ExecError::FieldAccess {
                field: field.clone(),
            }),
            Operand::Pipeline(inner) => self.eval_pipeline(inner),
        }
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, ExecError> {
        self.registry.call(name, args).map(Value::Str)
    }
}

/// Short description of a non-function operand for error messages
fn describe(operand: &Operand) -> String {
    match operand {
        Operand::Literal(Value::Str(s)) => format!("{:?}", s),
        Operand::Literal(value) => value.to_string(),
        Operand::Dot => ".".to_string(),
        Operand::Field(field) => format!(".{}", field),
        Operand::Pipeline(_) => "(pipeline)".to_string(),
        Operand::Identifier(name) => name.node.to_string(),
    }
}
