use std::{borrow::Cow, fmt};

use crate::{ClassFileError, Result};

/// Checked lookup of a constant pool entry of one expected variant.
#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        $cp.get($index).and_then(|cp_info| match cp_info {
            $crate::constant_pool::CpInfo::$i(n) => Ok(n),
            c => Err($crate::ClassFileError::UnexpectedConstantPoolEntry {
                index: $index,
                expected: $crate::constant_pool::ConstantTag::$i,
                found: c.tag(),
            }),
        })
    };
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct ConstantPool {
    slots: Vec<Slot>,
}
impl ConstantPool {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Number of slots, placeholders included. Equals `constant_pool_count - 1`.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Looks up the entry at a 1-based `index`.
    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        if index == 0 {
            return Err(ClassFileError::ZeroIndex);
        }

        match self.slots.get(index as usize - 1) {
            Some(Slot::Entry(cp_info)) => Ok(cp_info),
            Some(Slot::Placeholder) => Err(ClassFileError::PlaceholderIndex(index)),
            None => Err(ClassFileError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            }),
        }
    }

    /// Real entries with their 1-based indices; placeholder slots are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Entry(cp_info) => Some((i as u16 + 1, cp_info)),
                Slot::Placeholder => None,
            })
    }

    pub fn utf8(&self, index: u16) -> Result<Cow<'_, str>> {
        Ok(matches_cp_info!(self, index, Utf8)?.to_str_lossy())
    }

    /// Resolves a `Class` entry to its internal (slash separated) name.
    pub fn class_name(&self, index: u16) -> Result<Cow<'_, str>> {
        let ClassInfo { name_index } = matches_cp_info!(self, index, Class)?;
        self.utf8(*name_index)
    }

    pub fn string(&self, index: u16) -> Result<Cow<'_, str>> {
        let StringInfo { string_index } = matches_cp_info!(self, index, String)?;
        self.utf8(*string_index)
    }

    /// Resolves a `NameAndType` entry to its name and descriptor.
    pub fn name_and_type(&self, index: u16) -> Result<(Cow<'_, str>, Cow<'_, str>)> {
        let NameAndTypeInfo {
            name_index,
            descriptor_index,
        } = matches_cp_info!(self, index, NameAndType)?;

        Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a Slot;
    type IntoIter = std::slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Slot {
    Entry(CpInfo),
    /// Second slot of a `Long` or `Double`; never addressable.
    Placeholder,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ConstantTag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    FieldRef,
    MethodRef,
    InterfaceMethodRef,
    NameAndType,
    MethodHandle,
    MethodType,
    InvokeDynamic,
}
impl ConstantTag {
    pub fn name(&self) -> &'static str {
        match self {
            ConstantTag::Utf8 => "Utf8",
            ConstantTag::Integer => "Integer",
            ConstantTag::Float => "Float",
            ConstantTag::Long => "Long",
            ConstantTag::Double => "Double",
            ConstantTag::Class => "Class",
            ConstantTag::String => "String",
            ConstantTag::FieldRef => "Fieldref",
            ConstantTag::MethodRef => "Methodref",
            ConstantTag::InterfaceMethodRef => "InterfaceMethodref",
            ConstantTag::NameAndType => "NameAndType",
            ConstantTag::MethodHandle => "MethodHandle",
            ConstantTag::MethodType => "MethodType",
            ConstantTag::InvokeDynamic => "InvokeDynamic",
        }
    }

    /// Number of pool slots an entry with this tag occupies.
    pub fn slot_size(&self) -> usize {
        match self {
            ConstantTag::Long | ConstantTag::Double => 2,
            _ => 1,
        }
    }
}
impl fmt::Display for ConstantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
impl TryFrom<u8> for ConstantTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ConstantTag::Utf8),
            3 => Ok(ConstantTag::Integer),
            4 => Ok(ConstantTag::Float),
            5 => Ok(ConstantTag::Long),
            6 => Ok(ConstantTag::Double),
            7 => Ok(ConstantTag::Class),
            8 => Ok(ConstantTag::String),
            9 => Ok(ConstantTag::FieldRef),
            10 => Ok(ConstantTag::MethodRef),
            11 => Ok(ConstantTag::InterfaceMethodRef),
            12 => Ok(ConstantTag::NameAndType),
            15 => Ok(ConstantTag::MethodHandle),
            16 => Ok(ConstantTag::MethodType),
            18 => Ok(ConstantTag::InvokeDynamic),
            _ => Err(value),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(Utf8Info),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String(StringInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    InvokeDynamic(InvokeDynamicInfo),
}
impl CpInfo {
    pub fn tag(&self) -> ConstantTag {
        match self {
            CpInfo::Utf8(_) => ConstantTag::Utf8,
            CpInfo::Integer(_) => ConstantTag::Integer,
            CpInfo::Float(_) => ConstantTag::Float,
            CpInfo::Long(_) => ConstantTag::Long,
            CpInfo::Double(_) => ConstantTag::Double,
            CpInfo::Class(_) => ConstantTag::Class,
            CpInfo::String(_) => ConstantTag::String,
            CpInfo::FieldRef(_) => ConstantTag::FieldRef,
            CpInfo::MethodRef(_) => ConstantTag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => ConstantTag::InterfaceMethodRef,
            CpInfo::NameAndType(_) => ConstantTag::NameAndType,
            CpInfo::MethodHandle(_) => ConstantTag::MethodHandle,
            CpInfo::MethodType(_) => ConstantTag::MethodType,
            CpInfo::InvokeDynamic(_) => ConstantTag::InvokeDynamic,
        }
    }
}

/// Raw bytes of a `CONSTANT_Utf8_info`.
///
/// The class file stores these as "modified UTF-8". The bytes are kept as read;
/// [`Utf8Info::to_str_lossy`] converts them as standard UTF-8, which agrees with
/// the modified form for everything except NUL and supplementary characters.
#[derive(PartialEq, Eq, Clone)]
pub struct Utf8Info {
    pub bytes: Vec<u8>,
}
impl Utf8Info {
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}
impl fmt::Debug for Utf8Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Utf8Info({:?})", self.to_str_lossy())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // Must point at a Utf8 entry holding a binary class name in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct StringInfo {
    pub string_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

#[cfg(test)]
mod lookup_tests {
    use super::*;

    fn utf8(s: &str) -> Slot {
        Slot::Entry(CpInfo::Utf8(Utf8Info {
            bytes: s.as_bytes().to_vec(),
        }))
    }

    fn pool() -> ConstantPool {
        ConstantPool::new(vec![
            utf8("java/lang/Object"),
            Slot::Entry(CpInfo::Class(ClassInfo { name_index: 1 })),
            Slot::Entry(CpInfo::Long(42)),
            Slot::Placeholder,
            Slot::Entry(CpInfo::String(StringInfo { string_index: 6 })),
            utf8("hello"),
        ])
    }

    #[test]
    fn it_should_resolve_utf8_entries() {
        assert_eq!(pool().utf8(1).unwrap(), "java/lang/Object");
    }

    #[test]
    fn it_should_resolve_class_and_string_entries_through_utf8() {
        let pool = pool();

        assert_eq!(pool.class_name(2).unwrap(), "java/lang/Object");
        assert_eq!(pool.string(5).unwrap(), "hello");
    }

    #[test]
    fn it_should_reject_index_zero() {
        assert!(matches!(pool().get(0), Err(ClassFileError::ZeroIndex)));
    }

    #[test]
    fn it_should_reject_out_of_range_indices() {
        assert!(matches!(
            pool().get(7),
            Err(ClassFileError::IndexOutOfRange { index: 7, len: 6 })
        ));
    }

    #[test]
    fn it_should_reject_placeholder_slots() {
        assert!(matches!(
            pool().get(4),
            Err(ClassFileError::PlaceholderIndex(4))
        ));
    }

    #[test]
    fn it_should_reject_the_wrong_variant() {
        match pool().utf8(2) {
            Err(ClassFileError::UnexpectedConstantPoolEntry {
                index,
                expected,
                found,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(expected, ConstantTag::Utf8);
                assert_eq!(found, ConstantTag::Class);
            }
            other => panic!("expected a variant mismatch, got {:?}", other),
        }
    }

    #[test]
    fn it_should_iterate_real_entries_with_their_indices() {
        let pool = pool();
        let indices = pool.iter().map(|(i, _)| i).collect::<Vec<_>>();

        assert_eq!(indices, vec![1, 2, 3, 5, 6]);
        assert_eq!(pool.len(), 6);
    }
}
