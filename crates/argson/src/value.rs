//! Typed token conversion, one impl per semantic category.
//!
//! Matcher and conversion selection happen where the option is declared,
//! driven by the target's static type; parsing never branches on runtime
//! type information.

use std::fmt;
use std::path::PathBuf;

use argson_argparse::Matcher;
use serde_json::Value;

/// Semantic category of a bindable type, checked before generic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Integer,
    Float,
    Text,
}

impl Category {
    /// Input-matching predicate for the category.
    pub fn matcher(self) -> Matcher {
        match self {
            Self::Integer => Matcher::Integers,
            Self::Float => Matcher::Numbers,
            Self::Text => Matcher::NonEmpty,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "floating-point",
            Self::Text => "string",
        };
        f.write_str(name)
    }
}

/// A matched token could not be converted into the target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    token: String,
    expected: Category,
}

impl ConvertError {
    fn new(token: &str, expected: Category) -> Self {
        Self {
            token: token.to_string(),
            expected,
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} value: '{}'", self.expected, self.token)
    }
}

impl std::error::Error for ConvertError {}

/// A value type that can be bound to a command-line option.
///
/// `bool` has no impl on purpose: boolean options are pure flags and take
/// no value token, so routing one through a value-taking entry point fails
/// to compile.
pub trait Bindable: Clone + Default + 'static {
    /// Semantic category; fixed per impl.
    const CATEGORY: Category;

    /// Sequence types append one element per match instead of replacing
    /// the whole value, and mark the option repeatable.
    const REPEATABLE: bool = false;

    /// Convert `raw` and store it: replace for scalars, append for
    /// sequences. A failure must abort the surrounding parse; the value is
    /// never partially or silently assigned.
    fn apply_token(&mut self, raw: &str) -> Result<(), ConvertError>;

    /// Current value as a JSON node.
    fn to_json(&self) -> Value;

    /// Rendering used when the default is shown in help text.
    fn default_text(&self) -> String;

    /// Input-matching predicate selected from the category.
    fn matcher() -> Matcher {
        Self::CATEGORY.matcher()
    }
}

macro_rules! numeric_bindable {
    ($category:expr => $($t:ty),+ $(,)?) => {$(
        impl Bindable for $t {
            const CATEGORY: Category = $category;

            fn apply_token(&mut self, raw: &str) -> Result<(), ConvertError> {
                *self = raw.parse().map_err(|_| ConvertError::new(raw, $category))?;
                Ok(())
            }

            fn to_json(&self) -> Value {
                Value::from(*self)
            }

            fn default_text(&self) -> String {
                self.to_string()
            }
        }
    )+};
}

numeric_bindable!(Category::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
numeric_bindable!(Category::Float => f32, f64);

impl Bindable for String {
    const CATEGORY: Category = Category::Text;

    fn apply_token(&mut self, raw: &str) -> Result<(), ConvertError> {
        raw.clone_into(self);
        Ok(())
    }

    fn to_json(&self) -> Value {
        Value::from(self.as_str())
    }

    fn default_text(&self) -> String {
        self.clone()
    }
}

// The second structurally different text representation; it routes through
// the same string conversion as `String`.
impl Bindable for PathBuf {
    const CATEGORY: Category = Category::Text;

    fn apply_token(&mut self, raw: &str) -> Result<(), ConvertError> {
        *self = PathBuf::from(raw);
        Ok(())
    }

    fn to_json(&self) -> Value {
        Value::String(self.to_string_lossy().into_owned())
    }

    fn default_text(&self) -> String {
        self.display().to_string()
    }
}

impl<T: Bindable> Bindable for Vec<T> {
    const CATEGORY: Category = T::CATEGORY;
    const REPEATABLE: bool = true;

    fn apply_token(&mut self, raw: &str) -> Result<(), ConvertError> {
        let mut element = T::default();
        element.apply_token(raw)?;
        self.push(element);
        Ok(())
    }

    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(Bindable::to_json).collect())
    }

    fn default_text(&self) -> String {
        let elements: Vec<String> = self.iter().map(Bindable::default_text).collect();
        format!("[{}]", elements.join(","))
    }
}
