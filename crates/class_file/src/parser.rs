use log::{debug, trace, warn};

use crate::{
    attributes::Attributes,
    class_file::{FieldInfo, MethodInfo, MAGIC},
    constant_pool::{
        ClassInfo, ConstantTag, CpInfo, InvokeDynamicInfo, MethodHandleInfo, MethodTypeInfo,
        NameAndTypeInfo, RefInfo, Slot, StringInfo, Utf8Info,
    },
    cursor::ByteCursor,
};

use super::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Abort with [`ClassFileError::BadMagic`] instead of decoding a file whose
    /// magic identifier is wrong.
    pub require_valid_magic: bool,
}

pub struct Parser<'a> {
    r: ByteCursor<'a>,
    options: ParserOptions,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, ParserOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: ParserOptions) -> Self {
        Self {
            r: ByteCursor::new(buf),
            options,
        }
    }

    pub fn parse(mut self) -> Result<ClassFile> {
        let magic = self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;
        let interfaces = self.r.read_u16_vec(interfaces_count as usize)?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        if !self.r.is_empty() {
            warn!(
                "Ignoring {} trailing bytes after the class attributes",
                self.r.remaining()
            );
        }
        debug!(
            "Parsed class file v{}.{}: {} constant pool slots, {} fields, {} methods, {} attributes",
            major_version,
            minor_version,
            constant_pool.len(),
            fields.len(),
            methods.len(),
            attributes.len()
        );

        Ok(ClassFile {
            magic,
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;
        trace!("field #{}:#{} {:?}", name_index, descriptor_index, access_flags);

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;
        trace!("method #{}:#{} {:?}", name_index, descriptor_index, access_flags);

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<u32> {
        match self.read_u32()? {
            MAGIC => Ok(MAGIC),
            magic_identifier if self.options.require_valid_magic => {
                Err(ClassFileError::BadMagic(magic_identifier))
            }
            magic_identifier => {
                warn!("Invalid magic identifier: 0x{:X}", magic_identifier);
                Ok(magic_identifier)
            }
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;

        // Index 0 is implicit, so a well-formed count is at least 1.
        let count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while res.len() < count {
            let index = res.len() as u16 + 1;
            let cp_info = self.parse_cp_info()?;
            let slot_size = cp_info.tag().slot_size();
            if res.len() + slot_size > count {
                return Err(ClassFileError::ConstantPoolOverflow { index });
            }

            trace!("#{} = {:?}", index, cp_info);
            res.push(Slot::Entry(cp_info));
            (1..slot_size).for_each(|_| res.push(Slot::Placeholder));
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<CpInfo> {
        let offset = self.r.position();
        let tag = ConstantTag::try_from(self.read_u8()?)
            .map_err(|tag| ClassFileError::UnknownConstantTag { tag, offset })?;

        match tag {
            ConstantTag::Utf8 => self.parse_utf8(),
            ConstantTag::Integer => self.parse_integer(),
            ConstantTag::Float => self.parse_float(),
            ConstantTag::Long => self.parse_long(),
            ConstantTag::Double => self.parse_double(),
            ConstantTag::Class => self.parse_class_info(),
            ConstantTag::String => self.parse_string(),
            ConstantTag::FieldRef => self.parse_ref_info().map(CpInfo::FieldRef),
            ConstantTag::MethodRef => self.parse_ref_info().map(CpInfo::MethodRef),
            ConstantTag::InterfaceMethodRef => {
                self.parse_ref_info().map(CpInfo::InterfaceMethodRef)
            }
            ConstantTag::NameAndType => self.parse_name_and_type_info(),
            ConstantTag::MethodHandle => self.parse_method_handle(),
            ConstantTag::MethodType => self.parse_method_type_info(),
            ConstantTag::InvokeDynamic => self.parse_invoke_dynamic_info(),
        }
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.r.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(Utf8Info { bytes }))
    }

    fn parse_integer(&mut self) -> Result<CpInfo> {
        Ok(CpInfo::Integer(self.r.read_i32()?))
    }

    // https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-4.html#jvms-4.4.4
    fn parse_float(&mut self) -> Result<CpInfo> {
        Ok(CpInfo::Float(f32::from_bits(self.read_u32()?)))
    }

    // https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-4.html#jvms-4.4.5
    fn parse_long(&mut self) -> Result<CpInfo> {
        Ok(CpInfo::Long(self.r.read_i64()?))
    }

    fn parse_double(&mut self) -> Result<CpInfo> {
        Ok(CpInfo::Double(f64::from_bits(self.r.read_u64()?)))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;

        Ok(CpInfo::Class(ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.read_u16()?;

        Ok(CpInfo::String(StringInfo { string_index }))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::MethodType(MethodTypeInfo { descriptor_index }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<CpInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(CpInfo::InvokeDynamic(InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let info = self.r.read_bytes(attribute_length as usize)?;

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    fn parse_attributes(&mut self, attributes_count: u16) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.r.read_u32()
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.r.read_u16()
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.r.read_u8()
    }
}

#[cfg(test)]
mod parse_magic_identifier_tests {
    use super::*;

    #[test]
    fn it_should_be_able_to_parse_the_correct_identifier() {
        assert_eq!(
            Parser::new(&[0xca, 0xfe, 0xba, 0xbe])
                .parse_magic_identifier()
                .unwrap(),
            MAGIC
        );
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(matches!(
            Parser::new(&[0xca, 0xfe, 0xba]).parse_magic_identifier(),
            Err(ClassFileError::Truncated { offset: 0, .. })
        ));
    }

    #[test]
    fn it_should_report_an_incorrect_identifier_without_failing() {
        assert_eq!(
            Parser::new(&[0xde, 0xad, 0xbe, 0xef])
                .parse_magic_identifier()
                .unwrap(),
            0xDEADBEEF
        );
    }

    #[test]
    fn it_should_fail_on_an_incorrect_identifier_when_required() {
        let options = ParserOptions {
            require_valid_magic: true,
        };

        assert!(matches!(
            Parser::with_options(&[0xde, 0xad, 0xbe, 0xef], options).parse_magic_identifier(),
            Err(ClassFileError::BadMagic(0xDEADBEEF))
        ));
    }
}


#[cfg(test)]
mod parse_cp_info_tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Result<CpInfo> {
        Parser::new(bytes).parse_cp_info()
    }

    #[test]
    fn it_should_parse_utf8_bytes_verbatim() {
        assert_eq!(
            parse(&[0x01, 0x00, 0x03, b'a', 0xc0, 0x80]).unwrap(),
            CpInfo::Utf8(Utf8Info {
                bytes: vec![b'a', 0xc0, 0x80],
            })
        );
    }

    #[test]
    fn it_should_parse_integers_as_signed() {
        assert_eq!(
            parse(&[0x03, 0xff, 0xff, 0xff, 0xff]).unwrap(),
            CpInfo::Integer(-1)
        );
    }

    #[test]
    fn it_should_parse_floats_from_their_bit_pattern() {
        assert_eq!(
            parse(&[0x04, 0x3f, 0x00, 0x00, 0x00]).unwrap(),
            CpInfo::Float(0.5)
        );
        assert_eq!(
            parse(&[0x04, 0x7f, 0x80, 0x00, 0x00]).unwrap(),
            CpInfo::Float(f32::INFINITY)
        );
    }

    #[test]
    fn it_should_combine_both_halves_of_a_long() {
        assert_eq!(
            parse(&[0x05, 0x00, 0x00, 0x01, 0x1f, 0x71, 0xfb, 0x04, 0xcb]).unwrap(),
            CpInfo::Long(1234567890123)
        );
    }

    #[test]
    fn it_should_combine_both_halves_of_a_double() {
        assert_eq!(
            parse(&[0x06, 0x40, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]).unwrap(),
            CpInfo::Double(2.5)
        );
    }

    #[test]
    fn it_should_parse_member_references() {
        assert_eq!(
            parse(&[0x0b, 0x00, 0x1b, 0x00, 0x1c]).unwrap(),
            CpInfo::InterfaceMethodRef(RefInfo {
                class_index: 27,
                name_and_type_index: 28,
            })
        );
    }

    #[test]
    fn it_should_parse_method_handles() {
        assert_eq!(
            parse(&[0x0f, 0x06, 0x00, 0x55]).unwrap(),
            CpInfo::MethodHandle(MethodHandleInfo {
                reference_kind: 6,
                reference_index: 85,
            })
        );
    }

    #[test]
    fn it_should_fail_on_an_undefined_tag() {
        assert!(matches!(
            parse(&[0x00, 0x00, 0x01]),
            Err(ClassFileError::UnknownConstantTag { tag: 0, offset: 0 })
        ));
        assert!(matches!(
            parse(&[0x02, 0x00, 0x01]),
            Err(ClassFileError::UnknownConstantTag { tag: 2, offset: 0 })
        ));
    }

    #[test]
    fn it_should_fail_on_a_short_payload() {
        assert!(matches!(
            parse(&[0x01, 0x00, 0x05, b'a', b'b']),
            Err(ClassFileError::Truncated {
                offset: 3,
                needed: 5,
                available: 2,
            })
        ));
    }
}



#[cfg(test)]
mod parse_tests {
    use super::*;

    // public class Empty extends java/lang/Object, no members.
    const EMPTY_CLASS: &[u8] = &[
        0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x34, // header
        0x00, 0x05, // constant_pool_count
        0x07, 0x00, 0x02, // #1 Class #2
        0x01, 0x00, 0x05, b'E', b'm', b'p', b't', b'y', // #2 Utf8
        0x07, 0x00, 0x04, // #3 Class #4
        0x01, 0x00, 0x10, b'j', b'a', b'v', b'a', b'/', b'l', b'a', b'n', b'g', b'/', b'O', b'b',
        b'j', b'e', b'c', b't', // #4 Utf8
        0x00, 0x21, // access_flags
        0x00, 0x01, // this_class
        0x00, 0x03, // super_class
        0x00, 0x00, // interfaces_count
        0x00, 0x00, // fields_count
        0x00, 0x00, // methods_count
        0x00, 0x00, // attributes_count
    ];

    #[test]
    fn it_should_parse_a_minimal_class() {
        let class_file = Parser::new(EMPTY_CLASS).parse().unwrap();

        assert!(class_file.has_valid_magic());
        assert_eq!(class_file.version(), (52, 0));
        assert_eq!(class_file.constant_pool.len(), 4);
        assert_eq!(
            class_file.access_flags,
            AccessFlags::PUBLIC | AccessFlags::SUPER
        );
        assert_eq!(class_file.class_name().unwrap(), "Empty");
        assert_eq!(
            class_file.super_class().unwrap().as_deref(),
            Some("java/lang/Object")
        );
        assert!(class_file.interfaces.is_empty());
        assert!(class_file.fields.is_empty());
        assert!(class_file.methods.is_empty());
        assert!(class_file.attributes.is_empty());
    }

    #[test]
    fn it_should_tolerate_trailing_bytes() {
        let mut bytes = EMPTY_CLASS.to_vec();
        bytes.extend_from_slice(&[0xff, 0xff]);

        assert!(Parser::new(&bytes).parse().is_ok());
    }

    #[test]
    fn it_should_fail_if_the_class_is_cut_short() {
        let bytes = &EMPTY_CLASS[..EMPTY_CLASS.len() - 1];

        assert!(matches!(
            Parser::new(bytes).parse(),
            Err(ClassFileError::Truncated { .. })
        ));
    }

    #[test]
    fn it_should_report_an_undefined_tag_at_its_offset() {
        let mut bytes = EMPTY_CLASS.to_vec();
        bytes[10] = 0x00;

        assert!(matches!(
            Parser::new(&bytes).parse(),
            Err(ClassFileError::UnknownConstantTag { tag: 0, offset: 10 })
        ));
    }
}
