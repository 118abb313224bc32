#[cfg(test)]
mod interop_tests {
    use std::io::Cursor;

    use crate::{
        binary::{decode, encode_to_vec},
        value::{Dictionary, Uid, Value},
    };

    #[test]
    fn can_read_output_with_plist_crate() {
        let mut dict = Dictionary::new();
        dict.insert("name", "bplist");
        dict.insert("unicode", "snow ☃");
        dict.insert("count", 300);
        dict.insert("negative", -5);
        dict.insert("ratio", 0.25);
        dict.insert("flag", true);
        dict.insert("blob", Value::data(vec![1, 2, 3]));
        dict.insert("uid", Value::Uid(Uid::new(9)));
        dict.insert(
            "list",
            Value::array((0..20).map(|idx| Value::from(format!("item {idx}"))).collect()),
        );

        let bytes = encode_to_vec(&Value::from(dict));
        let parsed = plist::Value::from_reader(Cursor::new(bytes)).unwrap();
        let root = parsed.as_dictionary().unwrap();

        assert_eq!(
            root.get("name").and_then(plist::Value::as_string),
            Some("bplist")
        );
        assert_eq!(
            root.get("unicode").and_then(plist::Value::as_string),
            Some("snow ☃")
        );
        assert_eq!(
            root.get("count").and_then(plist::Value::as_unsigned_integer),
            Some(300)
        );
        assert_eq!(
            root.get("negative")
                .and_then(plist::Value::as_signed_integer),
            Some(-5)
        );
        assert_eq!(
            root.get("ratio").and_then(plist::Value::as_real),
            Some(0.25)
        );
        assert_eq!(
            root.get("flag").and_then(plist::Value::as_boolean),
            Some(true)
        );
        assert_eq!(
            root.get("blob").and_then(plist::Value::as_data),
            Some(&[1u8, 2, 3][..])
        );
        assert_eq!(
            root.get("uid").and_then(plist::Value::as_uid).map(|uid| uid.get()),
            Some(9)
        );
        assert_eq!(
            root.get("list")
                .and_then(plist::Value::as_array)
                .map(|list| list.len()),
            Some(20)
        );
    }

    #[test]
    fn can_read_plist_crate_output() {
        let mut dict = plist::Dictionary::new();
        dict.insert("name".to_string(), plist::Value::String("plist".to_string()));
        dict.insert("big".to_string(), plist::Value::Integer(u32::MAX.into()));
        dict.insert("negative".to_string(), plist::Value::Integer((-42i64).into()));
        dict.insert("real".to_string(), plist::Value::Real(1.25));
        dict.insert(
            "items".to_string(),
            plist::Value::Array(vec![
                plist::Value::Boolean(false),
                plist::Value::Data(vec![0xDE, 0xAD]),
                plist::Value::Uid(plist::Uid::new(4)),
            ]),
        );

        let mut bytes = vec![];
        plist::Value::Dictionary(dict)
            .to_writer_binary(&mut bytes)
            .unwrap();

        let decoded = decode(&bytes).unwrap();
        let root = decoded.as_dictionary().unwrap();

        assert_eq!(root.get_str("name"), Some(&Value::from("plist")));
        assert_eq!(root.get_str("big"), Some(&Value::from(u32::MAX)));
        assert_eq!(root.get_str("negative"), Some(&Value::from(-42)));
        assert_eq!(root.get_str("real").and_then(Value::as_real), Some(1.25));
        assert_eq!(
            root.get_str("items"),
            Some(&Value::array(vec![
                Value::Boolean(false),
                Value::data(vec![0xDE, 0xAD]),
                Value::Uid(Uid::new(4)),
            ]))
        );
    }
}
