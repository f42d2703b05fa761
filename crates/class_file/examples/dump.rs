use std::{env, fs::File};

use kaffee_class_file::{
    format_field_access, format_method_access, parse_field_descriptor, parse_method_descriptor,
    ClassFile, ConstantPool, CpInfo,
};
use memmap::Mmap;

fn main() {
    pretty_env_logger::init();

    let path = env::args()
        .nth(1)
        .expect("usage: dump <path/to/Some.class>");
    let file = File::open(path).unwrap();
    let mmap = unsafe { Mmap::map(&file).unwrap() };

    let class_file = ClassFile::parse(&mmap).unwrap();
    let constant_pool = &class_file.constant_pool;

    let validity = if class_file.has_valid_magic() {
        "valid"
    } else {
        "INVALID"
    };
    println!("Magic: 0x{:X} ({})", class_file.magic, validity);
    println!("Major: {}", class_file.major_version);
    println!("Minor: {}", class_file.minor_version);

    println!();
    println!("ConstantPool: ({} slots)", constant_pool.len());
    let entries = constant_pool.iter().collect::<Vec<_>>();
    for (i, (index, cp_info)) in entries.iter().enumerate() {
        println!(
            "  {} {:02}: {}",
            branch(i, entries.len()),
            index,
            cp_info.tag()
        );
        println!("  │\t\t{}", describe(cp_info, constant_pool));
    }

    println!();
    println!("Methods: ({} entries)", class_file.methods.len());
    for (i, method) in class_file.methods.iter().enumerate() {
        let name = method.name(constant_pool).unwrap_or_default();
        let descriptor = method.descriptor(constant_pool).unwrap_or_default();
        match parse_method_descriptor(&descriptor) {
            Ok((parameters, return_type)) => println!(
                "  {} {} {} {}({})",
                branch(i, class_file.methods.len()),
                format_method_access(method.access_flags),
                return_type,
                name,
                parameters.join(", ")
            ),
            Err(e) => log::warn!("Skipping method {}: {}", name, e),
        }
    }

    println!();
    println!("Fields: ({} entries)", class_file.fields.len());
    for (i, field) in class_file.fields.iter().enumerate() {
        let name = field.name(constant_pool).unwrap_or_default();
        let descriptor = field.descriptor(constant_pool).unwrap_or_default();
        match parse_field_descriptor(&descriptor) {
            Ok(field_type) => println!(
                "  {} {} {} {}",
                branch(i, class_file.fields.len()),
                format_field_access(field.access_flags),
                field_type,
                name
            ),
            Err(e) => log::warn!("Skipping field {}: {}", name, e),
        }
    }

    println!();
    println!("Attrs: ({} entries)", class_file.attributes.len());
    for (i, attribute) in class_file.attributes.iter().enumerate() {
        println!(
            "  {} {}",
            branch(i, class_file.attributes.len()),
            attribute.name(constant_pool).unwrap_or_default()
        );
    }
}

fn branch(i: usize, len: usize) -> &'static str {
    if i + 1 == len {
        "└──"
    } else {
        "├──"
    }
}

fn describe(cp_info: &CpInfo, constant_pool: &ConstantPool) -> String {
    match cp_info {
        CpInfo::Utf8(utf8) => format!("{:?}", utf8.to_str_lossy()),
        CpInfo::Integer(i) => i.to_string(),
        CpInfo::Float(f) => f.to_string(),
        CpInfo::Long(l) => l.to_string(),
        CpInfo::Double(d) => d.to_string(),
        CpInfo::Class(class) => constant_pool
            .utf8(class.name_index)
            .unwrap_or_default()
            .into_owned(),
        CpInfo::String(string) => format!(
            "{:?}",
            constant_pool.utf8(string.string_index).unwrap_or_default()
        ),
        CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
            let class = constant_pool.class_name(r.class_index).unwrap_or_default();
            match constant_pool.name_and_type(r.name_and_type_index) {
                Ok((name, descriptor)) => format!("{}.{}:{}", class, name, descriptor),
                Err(e) => e.to_string(),
            }
        }
        CpInfo::NameAndType(nat) => format!("#{}:#{}", nat.name_index, nat.descriptor_index),
        CpInfo::MethodHandle(handle) => {
            format!("{}:#{}", handle.reference_kind, handle.reference_index)
        }
        CpInfo::MethodType(method_type) => constant_pool
            .utf8(method_type.descriptor_index)
            .unwrap_or_default()
            .into_owned(),
        CpInfo::InvokeDynamic(indy) => format!(
            "#{}:#{}",
            indy.bootstrap_method_attr_index, indy.name_and_type_index
        ),
    }
}
