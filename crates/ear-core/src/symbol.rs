// Reserved symbol and state numbers shared by the model codec and the decoder.

/// Empty symbol. As an input symbol it marks a transition that consumes no
/// feature vector; as an output symbol it means no event boundary is crossed.
pub const EPSILON: u32 = 0;

/// Start state of every search network. The decoder seeds its root token here.
pub const START_STATE: u32 = 0;

/// Returns `true` if `symbol` is the empty symbol.
#[inline]
pub fn is_epsilon(symbol: u32) -> bool {
    symbol == EPSILON
}
