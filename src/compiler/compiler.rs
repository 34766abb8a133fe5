//! Grammar-based compiler: operation-language source to predicate tree
//!
//! The source is parsed into a spanned tree first; the tree is then walked
//! with the shared resolver and operator registry. Semantic errors carry the
//! source text of the leaf that raised them.

use crate::ast::{AttributeExpr, CompositeOperation, ExistenceOperator, PathExpr, PathRoot};
use crate::config::CompilerConfig;
use crate::error::{CompileResult, ErrorLocation, Rejection, SourceExcerpt};
use crate::model::SchemaProvider;
use crate::operation::{AttributeFunction, AttributeRef, FunctionName, Operation};
use crate::parser::{Spanned, parse_operation};
use crate::registry::{Argument, Operator, OperatorRegistry};
use crate::resolver::{Resolver, Scope};
use log::debug;

/// Compiles operation-language source against a schema
///
/// A compiler holds no per-compile state, so one instance may serve any
/// number of compile calls.
pub struct OperationCompiler<'a> {
    resolver: Resolver<'a>,
    registry: OperatorRegistry,
    config: CompilerConfig,
}

impl<'a> OperationCompiler<'a> {
    /// Create a compiler with the default configuration
    pub fn new(schema: &'a dyn SchemaProvider) -> Self {
        Self::with_config(schema, CompilerConfig::default())
    }

    /// Create a compiler with a custom configuration
    pub fn with_config(schema: &'a dyn SchemaProvider, config: CompilerConfig) -> Self {
        Self {
            resolver: Resolver::new(schema),
            registry: OperatorRegistry::new(&config),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `source` into a predicate over `root_type`
    pub fn compile(&self, root_type: &str, source: &str) -> CompileResult<Operation> {
        debug!("Compiling operation on {root_type} ({} bytes)", source.len());
        let result = self.compile_source(root_type, source);
        match &result {
            Ok(operation) => debug!("Compiled {root_type}: {operation}"),
            Err(error) => debug!("Compilation failed: {error}"),
        }
        result
    }

    fn compile_source(&self, root_type: &str, source: &str) -> CompileResult<Operation> {
        let tree = parse_operation(source, self.config.max_depth)
            .map_err(|error| error.to_compile_error(source))?;
        let scope = self
            .resolver
            .root(root_type)
            .map_err(|rejection| rejection.at(excerpt(source, 0, source.len())))?;
        self.composite(source, &scope, &tree)
    }

    fn composite(
        &self,
        source: &str,
        scope: &Scope,
        node: &Spanned<CompositeOperation>,
    ) -> CompileResult<Operation> {
        let at_leaf = |rejection: Rejection| rejection.at(excerpt(source, node.start, node.end));

        match &node.value {
            CompositeOperation::All => Ok(Operation::All),
            CompositeOperation::None => Ok(Operation::None),
            CompositeOperation::And(children) => {
                children.iter().try_fold(Operation::All, |operation, child| {
                    Ok(operation.and(self.composite(source, scope, child)?))
                })
            }
            CompositeOperation::Or(children) => {
                let mut operations = children
                    .iter()
                    .map(|child| self.composite(source, scope, child));
                let first = operations.next().transpose()?.unwrap_or(Operation::None);
                operations.try_fold(first, |operation, next| Ok(operation.or(next?)))
            }
            CompositeOperation::Group(inner) => self.composite(source, scope, inner),
            CompositeOperation::Unary {
                attribute,
                operator,
            } => {
                let attribute = self.attribute(scope, attribute).map_err(at_leaf)?;
                self.registry
                    .compare(&attribute, *operator, Argument::Empty)
                    .map_err(at_leaf)
            }
            CompositeOperation::Binary {
                attribute,
                operator,
                parameter,
            } => {
                let attribute = self.attribute(scope, attribute).map_err(at_leaf)?;
                self.registry
                    .compare(&attribute, *operator, Argument::Value(parameter.value.clone()))
                    .map_err(at_leaf)
            }
            CompositeOperation::Existence {
                navigation,
                operator,
                filter,
            } => {
                let at_navigation = |rejection: Rejection| {
                    rejection.at(excerpt(source, navigation.start, navigation.end))
                };
                let target = self
                    .navigate(scope, &navigation.value)
                    .map_err(at_navigation)?;
                let relationship = target
                    .relationship_path()
                    .ok_or_else(|| at_navigation(Rejection::structural("Expected a relationship")))?;
                let filter = filter
                    .as_deref()
                    .map(|filter| self.composite(source, &target.rebase(), filter))
                    .transpose()?
                    .map(Box::new);

                Ok(match operator {
                    ExistenceOperator::Exists => Operation::Exists {
                        relationship,
                        filter,
                    },
                    ExistenceOperator::NotExists => Operation::NotExists {
                        relationship,
                        filter,
                    },
                    ExistenceOperator::RecursiveNotExists => Operation::RecursiveNotExists {
                        relationship,
                        filter,
                    },
                })
            }
        }
    }

    /// Check the root and follow every segment as a relationship
    fn navigate(&self, scope: &Scope, path: &PathExpr) -> Result<Scope, Rejection> {
        self.check_root(scope, path)?;
        path.segments
            .iter()
            .try_fold(scope.clone(), |scope, segment| {
                self.resolver.navigate(&scope, &segment.value)
            })
    }

    fn check_root(&self, scope: &Scope, path: &PathExpr) -> Result<(), Rejection> {
        match &path.root.value {
            PathRoot::This => Ok(()),
            PathRoot::Class(name) => self.resolver.check_root(scope, name),
        }
    }

    fn attribute(
        &self,
        scope: &Scope,
        expr: &Spanned<AttributeExpr>,
    ) -> Result<AttributeRef, Rejection> {
        match &expr.value {
            AttributeExpr::Path(path) => {
                self.check_root(scope, path)?;
                let target = path
                    .navigation()
                    .iter()
                    .try_fold(scope.clone(), |scope, segment| {
                        self.resolver.navigate(&scope, &segment.value)
                    })?;
                let terminal = path
                    .terminal()
                    .ok_or_else(|| Rejection::structural("Expected an attribute name"))?;
                self.resolver.attribute(&target, &terminal.value)
            }
            AttributeExpr::Function {
                name,
                argument,
                args,
            } => {
                let source = self.attribute(scope, argument)?;
                let function = function(&name.value, args)?;
                self.registry.apply_function(source, function)
            }
        }
    }
}

fn excerpt(source: &str, start: usize, end: usize) -> ErrorLocation {
    ErrorLocation::Source(SourceExcerpt::range(source, start, end))
}

/// Resolve a function name and its integer arguments
fn function(name: &str, args: &[Spanned<i64>]) -> Result<AttributeFunction, Rejection> {
    let Some(Operator::Function(function)) = Operator::from_name(name) else {
        return Err(Rejection::operator(format!("Unknown function '{name}'")));
    };

    let expected = match function {
        FunctionName::Substring => 2,
        _ => 0,
    };
    if args.len() != expected {
        return Err(Rejection::operator(format!(
            "Function '{}' takes {} integer arguments but found {}",
            function.name(),
            expected,
            args.len()
        )));
    }

    Ok(match function {
        FunctionName::ToLowerCase => AttributeFunction::ToLowerCase,
        FunctionName::AbsoluteValue => AttributeFunction::AbsoluteValue,
        FunctionName::Year => AttributeFunction::Year,
        FunctionName::Month => AttributeFunction::Month,
        FunctionName::DayOfMonth => AttributeFunction::DayOfMonth,
        FunctionName::Substring => {
            let (start, end) = (args[0].value, args[1].value);
            match (i32::try_from(start), i32::try_from(end)) {
                (Ok(start), Ok(end)) => AttributeFunction::Substring { start, end },
                _ => {
                    return Err(Rejection::operator(format!(
                        "Invalid substring range [{start}, {end}]"
                    )));
                }
            }
        }
    })
}
