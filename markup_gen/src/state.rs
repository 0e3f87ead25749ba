/// What kind of region the parser is currently inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Markup,
    /// Attribute value; `Some(quote)` when quoted.
    AttributeValue(Option<char>),
}
