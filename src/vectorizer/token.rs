use std::{borrow::Cow, fmt, sync::Arc};

/// Tokenizer トレイト
///
/// Turns one document into an ordered token sequence. Implementations must
/// be pure: the same text always yields the same tokens and nothing is
/// shared between calls.
///
/// `name` identifies the tokenization policy. A vocabulary records the
/// name of the analyzer that built it, and building a matrix with a
/// differently named one logs a warning.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    fn name(&self) -> Cow<'_, str>;
}

impl<T> Tokenizer for Box<T>
where
    T: Tokenizer + ?Sized,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        (**self).tokenize(text)
    }

    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
}

impl<T> Tokenizer for Arc<T>
where
    T: Tokenizer + ?Sized,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        (**self).tokenize(text)
    }

    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
}

/// Default word tokenizer.
///
/// Lower-cases the text (when enabled), splits on every character that is
/// not alphanumeric and drops tokens shorter than `min_token_len` chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultTokenizer {
    lowercase: bool,
    min_token_len: usize,
}

impl DefaultTokenizer {
    pub fn new(lowercase: bool, min_token_len: usize) -> Self {
        Self {
            lowercase,
            min_token_len: min_token_len.max(1),
        }
    }
}

impl Default for DefaultTokenizer {
    fn default() -> Self {
        Self::new(true, 2)
    }
}

impl Tokenizer for DefaultTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let text: Cow<'_, str> = if self.lowercase {
            Cow::Owned(text.to_lowercase())
        } else {
            Cow::Borrowed(text)
        };
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|tok| !tok.is_empty() && tok.chars().count() >= self.min_token_len)
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "default(lowercase={},min_len={})",
            self.lowercase, self.min_token_len
        ))
    }
}

/// Adapts a plain function into a [`Tokenizer`].
///
/// ```
/// use text_feature_vectorizer::{FnTokenizer, Tokenizer};
///
/// let ws = FnTokenizer::new("whitespace", |text: &str| {
///     text.split_whitespace().map(str::to_string).collect()
/// });
/// assert_eq!(ws.tokenize("a b  c"), vec!["a", "b", "c"]);
/// ```
pub struct FnTokenizer<F> {
    name: String,
    func: F,
}

impl<F> FnTokenizer<F>
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Tokenizer for FnTokenizer<F>
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        (self.func)(text)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

impl<F> fmt::Debug for FnTokenizer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTokenizer").field("name", &self.name).finish()
    }
}
