/// Builds `validator::ValidationErrors` in place, e.g.
/// `validation_errors!({"level": ["level" => "Level must be a number"]})`
macro_rules! validation_errors {
    ({$($field:tt: [$($code:tt => $value:tt),+]),*}) => {{
        use std::borrow::Cow;
        use std::collections::HashMap;
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        $(
            $(
                let error = ValidationError {
                    code: Cow::from($code),
                    message: Some(Cow::from($value)),
                    params: HashMap::new(),
                };
                errors.add($field, error);
            )+
        )*
        errors
    }};
}
