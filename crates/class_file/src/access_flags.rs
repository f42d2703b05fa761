use bitflags::bitflags;

bitflags! {
    /// Access and property flags of a class, field or method.
    ///
    /// Several bits mean different things depending on what they are attached to,
    /// so they carry one name per meaning.
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

const FIELD_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::VOLATILE, "volatile"),
    (AccessFlags::TRANSIENT, "transient"),
];

const METHOD_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::VOLATILE, "volatile"),
    (AccessFlags::NATIVE, "native"),
    (AccessFlags::ENUM, "enum"),
];

impl AccessFlags {
    /// Modifier keywords of a field, in source order.
    pub fn field_modifiers(&self) -> Vec<&'static str> {
        self.modifiers(FIELD_MODIFIERS)
    }

    /// Modifier keywords of a method, in source order.
    pub fn method_modifiers(&self) -> Vec<&'static str> {
        self.modifiers(METHOD_MODIFIERS)
    }

    fn modifiers(&self, table: &[(AccessFlags, &'static str)]) -> Vec<&'static str> {
        table
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, keyword)| *keyword)
            .collect()
    }
}

pub fn format_field_access(flags: AccessFlags) -> String {
    flags.field_modifiers().join(" ")
}

pub fn format_method_access(flags: AccessFlags) -> String {
    flags.method_modifiers().join(" ")
}

#[cfg(test)]
mod format_access_tests {
    use super::*;

    #[test]
    fn it_should_format_method_flags_in_source_order() {
        let flags = AccessFlags::FINAL | AccessFlags::STATIC | AccessFlags::PUBLIC;

        assert_eq!(format_method_access(flags), "public static final");
    }

    #[test]
    fn it_should_not_depend_on_the_order_bits_were_set() {
        let a = AccessFlags::from_bits_truncate(0x0010 | 0x0008 | 0x0001);
        let b = AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL;

        assert_eq!(format_method_access(a), format_method_access(b));
    }

    #[test]
    fn it_should_put_abstract_before_static_for_methods() {
        let flags = AccessFlags::PROTECTED | AccessFlags::ABSTRACT;

        assert_eq!(format_method_access(flags), "protected abstract");
    }

    #[test]
    fn it_should_read_the_shared_bit_as_transient_only_for_fields() {
        let flags = AccessFlags::from_bits_truncate(0x0089);

        assert_eq!(format_field_access(flags), "public static transient");
        assert_eq!(format_method_access(flags), "public static");
    }

    #[test]
    fn it_should_format_native_methods() {
        let flags = AccessFlags::from_bits_truncate(0x0101);

        assert_eq!(format_method_access(flags), "public native");
    }

    #[test]
    fn it_should_omit_bits_without_a_keyword() {
        let flags = AccessFlags::SYNTHETIC | AccessFlags::STRICT | AccessFlags::PRIVATE;

        assert_eq!(format_field_access(flags), "private");
        assert_eq!(format_method_access(flags), "private");
    }

    #[test]
    fn it_should_format_an_empty_mask_as_an_empty_string() {
        assert_eq!(format_field_access(AccessFlags::empty()), "");
        assert_eq!(format_method_access(AccessFlags::empty()), "");
    }
}
