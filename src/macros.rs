/// Build an ordered [`Fields`](crate::Fields) list.
///
/// ```
/// let fields = fanlog::fields! { "user" => "ada", "attempt" => 3, "ok" => true };
/// assert_eq!(fields.len(), 3);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $( fields.push($key, $value); )+
        fields
    }};
}

/// Join several displayable values with single spaces into one message.
///
/// ```
/// let message = fanlog::values!("user", 42, "logged in").to_string();
/// assert_eq!(message, "user 42 logged in");
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),+ $(,)?) => {
        $crate::Values(&[$(&$value as &dyn ::std::fmt::Display),+])
    };
}
