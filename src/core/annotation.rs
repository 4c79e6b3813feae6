//! Textual type annotations for models declared at runtime.
//!
//! Accepts both bracket and angle generics and a handful of spellings for
//! optionality: `Wrapper<int>`, `Optional[Wrapper[int]]`, `Option<Wrapper<i64>>`,
//! `Union[Wrapper[int], None]`, `Wrapper[int] | None`, `None`.

use crate::domain::model::FieldType;
use crate::utils::error::{ModelError, Result};
use serde_json::Value;
use std::fmt;

pub const DEFAULT_WRAPPER_NAMES: &[&str] = &["Wrapper", "Result"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAnnotation {
    NoneType,
    Named {
        name: String,
        args: Vec<TypeAnnotation>,
    },
    Union(Vec<TypeAnnotation>),
}

impl TypeAnnotation {
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            input,
            tokens: tokenize(input)?,
            pos: 0,
        };
        let annotation = parser.union()?;
        match parser.peek() {
            None => Ok(annotation),
            Some(token) => Err(parser.error(format!("unexpected '{}'", token))),
        }
    }

    pub fn is_none_type(&self) -> bool {
        matches!(self, TypeAnnotation::NoneType)
    }

    /// Whether a `None` value satisfies this type.
    pub fn accepts_none(&self) -> bool {
        match self {
            TypeAnnotation::NoneType => true,
            TypeAnnotation::Union(members) => members.iter().any(TypeAnnotation::is_none_type),
            TypeAnnotation::Named { .. } => false,
        }
    }

    /// Generic origin: the name without its arguments. `None` for unions and
    /// the none type.
    pub fn origin(&self) -> Option<&str> {
        match self {
            TypeAnnotation::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAnnotation::NoneType => f.write_str("None"),
            TypeAnnotation::Named { name, args } if args.is_empty() => f.write_str(name),
            TypeAnnotation::Named { name, args } => {
                write!(f, "{}[", name)?;
                write_joined(f, args)?;
                f.write_str("]")
            }
            TypeAnnotation::Union(members) => {
                f.write_str("Union[")?;
                write_joined(f, members)?;
                f.write_str("]")
            }
        }
    }
}

/// Scalar types whose JSON shape can be checked without a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Float,
    Str,
    Bool,
}

impl ScalarKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => Some(ScalarKind::Int),
            "float" | "f32" | "f64" => Some(ScalarKind::Float),
            "str" | "String" | "char" => Some(ScalarKind::Str),
            "bool" => Some(ScalarKind::Bool),
            _ => None,
        }
    }

    /// `int`, or `int` next to `None` in a union. Anything generic or with
    /// several concrete members is not a scalar.
    pub fn of(annotation: &TypeAnnotation) -> Option<Self> {
        match annotation {
            TypeAnnotation::Named { name, args } if args.is_empty() => Self::from_name(name),
            TypeAnnotation::Union(members) => {
                let mut concrete = members.iter().filter(|m| !m.is_none_type());
                match (concrete.next(), concrete.next()) {
                    (Some(only), None) => Self::of(only),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Integers are also floats; `null` is never admitted here.
    pub fn admits(self, value: &Value) -> bool {
        match self {
            ScalarKind::Int => value.is_i64() || value.is_u64(),
            ScalarKind::Float => value.is_number(),
            ScalarKind::Str => value.is_string(),
            ScalarKind::Bool => value.is_boolean(),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarKind::Int => "an integer",
            ScalarKind::Float => "a number",
            ScalarKind::Str => "a string",
            ScalarKind::Bool => "a boolean",
        })
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeAnnotation]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Open(char),
    Close(char),
    Comma,
    Pipe,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => f.write_str(name),
            Token::Open(c) | Token::Close(c) => write!(f, "{}", c),
            Token::Comma => f.write_str(","),
            Token::Pipe => f.write_str("|"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '<' | '[' | '(' => {
                tokens.push(Token::Open(c));
                chars.next();
            }
            '>' | ']' | ')' => {
                tokens.push(Token::Close(c));
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '|' => {
                tokens.push(Token::Pipe);
                chars.next();
            }
            c if c.is_alphanumeric() || c == '_' || c == ':' || c == '.' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == ':' || c == '.' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(ModelError::AnnotationError {
                    annotation: input.to_string(),
                    reason: format!("unexpected character '{}'", other),
                })
            }
        }
    }
    Ok(tokens)
}

fn closing(open: char) -> char {
    match open {
        '<' => '>',
        '[' => ']',
        _ => ')',
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, reason: impl Into<String>) -> ModelError {
        ModelError::AnnotationError {
            annotation: self.input.to_string(),
            reason: reason.into(),
        }
    }

    // union := term ('|' term)*
    fn union(&mut self) -> Result<TypeAnnotation> {
        let mut members = vec![self.term()?];
        while self.peek() == Some(&Token::Pipe) {
            self.next();
            members.push(self.term()?);
        }
        Ok(if members.len() == 1 {
            members.remove(0)
        } else {
            flatten_union(members)
        })
    }

    // term := '(' ')' | ident (open args close)?
    fn term(&mut self) -> Result<TypeAnnotation> {
        let path = match self.next() {
            Some(Token::Ident(path)) => path,
            Some(Token::Open('(')) => {
                return match self.next() {
                    Some(Token::Close(')')) => Ok(TypeAnnotation::NoneType),
                    _ => Err(self.error("only the unit type '()' may use parentheses")),
                };
            }
            Some(token) => return Err(self.error(format!("expected a type name, found '{}'", token))),
            None => return Err(self.error("expected a type name")),
        };
        // typing.Optional, std::option::Option -> last segment
        let name = path
            .rsplit(|c: char| c == '.' || c == ':')
            .next()
            .unwrap_or(path.as_str())
            .to_string();

        let args = match self.peek() {
            Some(Token::Open(open)) if *open != '(' => {
                let expected = closing(*open);
                self.next();
                let args = self.args()?;
                match self.next() {
                    Some(Token::Close(c)) if c == expected => args,
                    _ => return Err(self.error(format!("expected '{}' after arguments of {}", expected, name))),
                }
            }
            _ => Vec::new(),
        };

        let key = name.clone();
        Ok(match (key.as_str(), args.len()) {
            ("None" | "NoneType", 0) => TypeAnnotation::NoneType,
            ("Optional" | "Option", 1) => {
                let mut args = args;
                flatten_union(vec![args.remove(0), TypeAnnotation::NoneType])
            }
            ("Optional" | "Option", n) => {
                return Err(self.error(format!("{} takes exactly one argument, got {}", name, n)))
            }
            ("Union", 0) => return Err(self.error("Union needs at least one member")),
            ("Union", 1) => {
                let mut args = args;
                args.remove(0)
            }
            ("Union", _) => flatten_union(args),
            _ => TypeAnnotation::Named { name, args },
        })
    }

    // args := union (',' union)*
    fn args(&mut self) -> Result<Vec<TypeAnnotation>> {
        let mut args = vec![self.union()?];
        while self.peek() == Some(&Token::Comma) {
            self.next();
            if matches!(self.peek(), Some(Token::Close(_))) {
                break;
            }
            args.push(self.union()?);
        }
        Ok(args)
    }
}

// Union[Union[a, b], c] == Union[a, b, c], duplicates dropped.
fn flatten_union(members: Vec<TypeAnnotation>) -> TypeAnnotation {
    let mut flat: Vec<TypeAnnotation> = Vec::new();
    for member in members {
        let nested = match member {
            TypeAnnotation::Union(inner) => inner,
            other => vec![other],
        };
        for m in nested {
            if !flat.contains(&m) {
                flat.push(m);
            }
        }
    }
    if flat.len() == 1 {
        flat.remove(0)
    } else {
        TypeAnnotation::Union(flat)
    }
}

/// Decides which annotations denote the wrapper type.
#[derive(Debug, Clone)]
pub struct Classifier {
    wrapper_names: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_WRAPPER_NAMES.iter().map(|s| s.to_string()).collect())
    }
}

impl Classifier {
    pub fn new(wrapper_names: Vec<String>) -> Self {
        Self { wrapper_names }
    }

    fn is_wrapper_origin(&self, annotation: &TypeAnnotation) -> bool {
        annotation
            .origin()
            .is_some_and(|origin| self.wrapper_names.iter().any(|name| name == origin))
    }

    /// One level of union is looked through; every non-`None` member must
    /// then be a wrapper.
    pub fn is_wrapper_type(&self, annotation: &TypeAnnotation) -> bool {
        match annotation {
            TypeAnnotation::Union(members) => {
                let mut concrete = members.iter().filter(|m| !m.is_none_type()).peekable();
                concrete.peek().is_some() && concrete.all(|m| self.is_wrapper_origin(m))
            }
            other => self.is_wrapper_origin(other),
        }
    }

    pub fn classify(&self, annotation: Option<&TypeAnnotation>) -> FieldType {
        let Some(annotation) = annotation else {
            return FieldType::PLAIN;
        };
        let optional = annotation.accepts_none();
        if !self.is_wrapper_type(annotation) {
            return FieldType {
                optional,
                ..FieldType::PLAIN
            };
        }
        let wrappers: Vec<&TypeAnnotation> = match annotation {
            TypeAnnotation::Union(members) => members.iter().filter(|m| !m.is_none_type()).collect(),
            other => vec![other],
        };
        let inner_optional = wrappers.iter().any(|w| match w {
            TypeAnnotation::Named { args, .. } => args.first().is_some_and(TypeAnnotation::accepts_none),
            _ => false,
        });
        FieldType {
            wrapped: true,
            optional,
            inner_optional,
        }
    }

    /// The type of the value a field carries: the wrapper's argument for a
    /// wrapped field, the declared type otherwise. `None` for a bare
    /// `Wrapper` or a union of several concrete types.
    pub fn payload<'a>(&self, annotation: &'a TypeAnnotation) -> Option<&'a TypeAnnotation> {
        let concrete: Vec<&TypeAnnotation> = match annotation {
            TypeAnnotation::Union(members) => members.iter().filter(|m| !m.is_none_type()).collect(),
            other => vec![other],
        };
        let &[single] = concrete.as_slice() else {
            return None;
        };
        if !self.is_wrapper_origin(single) {
            return Some(single);
        }
        match single {
            TypeAnnotation::Named { args, .. } => args.first(),
            _ => None,
        }
    }

    pub fn classify_str(&self, annotation: Option<&str>) -> Result<FieldType> {
        let parsed = annotation.map(TypeAnnotation::parse).transpose()?;
        Ok(self.classify(parsed.as_ref()))
    }
}
