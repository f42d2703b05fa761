// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
pub mod constant_pool;
mod cursor;
pub mod descriptor;
mod error;
mod parser;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo, MAGIC};
pub use access_flags::{format_field_access, format_method_access, AccessFlags};
pub use attributes::{Attribute, Attributes};
pub use constant_pool::{ConstantPool, ConstantTag, CpInfo, Slot};
pub use cursor::ByteCursor;
pub use descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use error::ClassFileError;
pub use parser::{Parser, ParserOptions};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
