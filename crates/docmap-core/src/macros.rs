// doc
/// Build a `Document` literal: `doc! { "_id" => "u1", "name" => "Alice" }`.
#[macro_export]
macro_rules! doc {
    () => {
        $crate::value::Document::new()
    };
    ( $( $key:expr => $value:expr ),+ $(,)? ) => {{
        let mut doc = $crate::value::Document::new();
        $( doc.insert(($key).to_string(), $crate::value::Value::from($value)); )+
        doc
    }};
}

// list
/// Build a `Value::List` literal from anything convertible into `Value`.
#[macro_export]
macro_rules! list {
    () => {
        $crate::value::Value::List(Vec::new())
    };
    ( $( $value:expr ),+ $(,)? ) => {
        $crate::value::Value::List(vec![ $( $crate::value::Value::from($value) ),+ ])
    };
}
