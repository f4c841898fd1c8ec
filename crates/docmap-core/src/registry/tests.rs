use super::*;
use docmap_schema::FieldKind;
use std::thread;

fn user_schema() -> TypeSchema {
    TypeSchema::builder("User").id().scalar("name").build().unwrap()
}

#[test]
fn register_then_look_up_by_name_and_discriminator() {
    let registry = TypeRegistry::new();
    let registered = registry.register(user_schema()).unwrap();

    let by_name = registry.schema_for("User").unwrap();
    let by_disc = registry.schema_by_discriminator("User").unwrap();
    assert!(Arc::ptr_eq(&registered, &by_name));
    assert!(Arc::ptr_eq(&registered, &by_disc));
}

#[test]
fn custom_discriminator_keys_the_discriminator_map() {
    let registry = TypeRegistry::new();
    let schema = TypeSchema::builder("User")
        .discriminator("usr")
        .id()
        .build()
        .unwrap();
    registry.register(schema).unwrap();

    assert!(registry.schema_for("User").is_ok());
    assert!(registry.schema_by_discriminator("usr").is_ok());
    assert!(registry.schema_by_discriminator("User").is_err());
}

#[test]
fn duplicate_name_or_discriminator_is_rejected() {
    let registry = TypeRegistry::new();
    registry.register(user_schema()).unwrap();

    assert!(matches!(
        registry.register(user_schema()),
        Err(Error::DuplicateRegistration { .. })
    ));

    // A fresh name colliding on discriminator alone is also rejected.
    let colliding = TypeSchema::builder("Customer")
        .discriminator("User")
        .id()
        .build()
        .unwrap();
    assert!(matches!(
        registry.register(colliding),
        Err(Error::DuplicateRegistration { .. })
    ));
}

#[test]
fn unknown_lookups_fail() {
    let registry = TypeRegistry::new();
    assert!(matches!(
        registry.schema_for("Ghost"),
        Err(Error::UnknownType { .. })
    ));
    assert!(matches!(
        registry.schema_by_discriminator("Ghost"),
        Err(Error::UnknownType { .. })
    ));
    assert!(matches!(
        registry.serializer_for("Ghost"),
        Err(Error::UnknownType { .. })
    ));
    assert!(matches!(
        registry.reference_paths_for("Ghost"),
        Err(Error::UnknownType { .. })
    ));
}

#[test]
fn a_base_schema_must_be_registered_before_its_extensions() {
    let registry = TypeRegistry::new();
    let base = Arc::new(user_schema());

    let derived = TypeSchema::builder("Admin")
        .base(base.clone())
        .scalar("role")
        .build()
        .unwrap();
    assert!(matches!(
        registry.register(derived),
        Err(Error::UnknownType { .. })
    ));

    registry.register(user_schema()).unwrap();
    let derived = TypeSchema::builder("Admin")
        .base(base)
        .scalar("role")
        .build()
        .unwrap();
    assert!(registry.register(derived).is_ok());
}

#[test]
fn serializer_is_built_once_and_shared() {
    let registry = TypeRegistry::new();
    registry.register(user_schema()).unwrap();

    let first = registry.serializer_for("User").unwrap();
    let second = registry.serializer_for("User").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn concurrent_first_use_converges_on_one_serializer() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register(user_schema()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || registry.serializer_for("User").unwrap())
        })
        .collect();

    let serializers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for serializer in &serializers[1..] {
        assert!(Arc::ptr_eq(&serializers[0], serializer));
    }
}

#[test]
fn cascade_path_table_keeps_cascade_paths_only() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeSchema::builder("LineItem").id().build().unwrap())
        .unwrap();
    registry
        .register(TypeSchema::builder("User").id().build().unwrap())
        .unwrap();

    let order = TypeSchema::builder("Order")
        .id()
        .reference("buyer", "User")
        .field(
            "line_items",
            FieldKind::List(Box::new(FieldKind::Reference {
                target: "LineItem".into(),
                cascade: true,
            })),
        )
        .build()
        .unwrap();
    registry.register(order).unwrap();

    let paths = registry.reference_paths_for("Order").unwrap();
    let strings: Vec<_> = paths.iter().map(ToString::to_string).collect();
    assert_eq!(strings, ["line_items.$._id"]);
}

#[test]
fn extensions_inherit_base_cascade_paths() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeSchema::builder("Attachment").id().build().unwrap())
        .unwrap();

    let message = Arc::new(
        TypeSchema::builder("Message")
            .id()
            .cascade_reference("attachment", "Attachment")
            .build()
            .unwrap(),
    );
    registry.register((*message).clone()).unwrap();

    let reply = TypeSchema::builder("Reply")
        .base(message)
        .scalar("in_reply_to")
        .build()
        .unwrap();
    registry.register(reply).unwrap();

    let paths = registry.reference_paths_for("Reply").unwrap();
    let strings: Vec<_> = paths.iter().map(ToString::to_string).collect();
    assert_eq!(strings, ["attachment._id"]);
}
