// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.3

use std::fmt;

use crate::{ClassFileError, Result};

/// Array types may have at most this many dimensions.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}
impl BaseType {
    fn from_char(c: u8) -> Option<Self> {
        Some(match c {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// Binary class name with `/` separators, as stored in the descriptor.
    Object(String),
    Array {
        dimensions: u8,
        element: ElementType,
    },
}
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => f.write_str(base.name()),
            FieldType::Object(class_name) => f.write_str(&class_name.replace('/', ".")),
            FieldType::Array {
                dimensions,
                element,
            } => {
                fmt::Display::fmt(element, f)?;
                (0..*dimensions).try_for_each(|_| f.write_str("[]"))
            }
        }
    }
}

/// Non-array type held by [`FieldType::Array`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    Base(BaseType),
    Object(String),
}
impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Base(base) => f.write_str(base.name()),
            ElementType::Object(class_name) => f.write_str(&class_name.replace('/', ".")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Field(FieldType),
}
impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("void"),
            ReturnType::Field(field_type) => fmt::Display::fmt(field_type, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl FieldType {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut p = DescriptorParser::new(descriptor);
        let field_type = p.parse_field_type()?;
        p.expect_end()?;
        Ok(field_type)
    }
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut p = DescriptorParser::new(descriptor);
        if p.next() != Some(b'(') {
            return Err(p.error("method descriptor must start with '('"));
        }

        let mut parameters = Vec::new();
        loop {
            match p.peek() {
                Some(b')') => {
                    p.next();
                    break;
                }
                Some(_) => parameters.push(p.parse_field_type()?),
                None => return Err(p.error("missing ')' after parameter list")),
            }
        }

        let return_type = match p.peek() {
            Some(b'V') => {
                p.next();
                ReturnType::Void
            }
            _ => ReturnType::Field(p.parse_field_type()?),
        };
        p.expect_end()?;

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}

/// Parses a field descriptor into its source-level type name, e.g. `[[I` into `int[][]`.
pub fn parse_field_descriptor(descriptor: &str) -> Result<String> {
    Ok(FieldType::parse(descriptor)?.to_string())
}

/// Parses a method descriptor into its parameter type names and return type name.
pub fn parse_method_descriptor(descriptor: &str) -> Result<(Vec<String>, String)> {
    let MethodDescriptor {
        parameters,
        return_type,
    } = MethodDescriptor::parse(descriptor)?;

    Ok((
        parameters.iter().map(ToString::to_string).collect(),
        return_type.to_string(),
    ))
}

struct DescriptorParser<'a> {
    descriptor: &'a str,
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn new(descriptor: &'a str) -> Self {
        Self { descriptor, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.descriptor.as_bytes().get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn parse_field_type(&mut self) -> Result<FieldType> {
        let mut dimensions = 0usize;
        while self.peek() == Some(b'[') {
            self.pos += 1;
            dimensions += 1;
            if dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(self.error("array type has more than 255 dimensions"));
            }
        }

        let element = self.parse_element_type()?;
        if dimensions == 0 {
            return Ok(match element {
                ElementType::Base(base) => FieldType::Base(base),
                ElementType::Object(class_name) => FieldType::Object(class_name),
            });
        }

        Ok(FieldType::Array {
            dimensions: dimensions as u8,
            element,
        })
    }

    fn parse_element_type(&mut self) -> Result<ElementType> {
        match self.next() {
            Some(b'L') => self.parse_object_type().map(ElementType::Object),
            Some(b'V') => Err(self.error("void is only allowed as a return type")),
            Some(c) => BaseType::from_char(c)
                .map(ElementType::Base)
                .ok_or_else(|| self.error("unrecognized type character")),
            None => Err(self.error("expected a field type")),
        }
    }

    fn parse_object_type(&mut self) -> Result<String> {
        let descriptor = self.descriptor;
        let rest = &descriptor[self.pos..];
        let end = rest
            .find(';')
            .ok_or_else(|| self.error("missing ';' after class name"))?;
        if end == 0 {
            return Err(self.error("empty class name"));
        }

        self.pos += end + 1;
        Ok(rest[..end].to_owned())
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error("unexpected trailing characters")),
        }
    }

    fn error(&self, reason: &'static str) -> ClassFileError {
        ClassFileError::invalid_descriptor(self.descriptor, reason)
    }
}
