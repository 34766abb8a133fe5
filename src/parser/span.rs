// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Byte ranges for tokens and parse-tree nodes
//!
//! The tokenizer runs over a [`Span`] so every token knows its offset. Parse
//! tree nodes keep `start..end` offsets into the operation source, which the
//! compiler turns into line/column excerpts when a leaf is rejected.

use nom_locate::LocatedSpan;

/// Tokenizer input: the operation source with its current offset
pub type Span<'a> = LocatedSpan<&'a str>;

/// A token or parse-tree node with the source range it covers
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The value
    pub value: T,
    /// Start offset in the source
    pub start: usize,
    /// End offset in the source, exclusive
    pub end: usize,
}

impl<T> Spanned<T> {
    /// Wrap a value covering `start..end`
    pub fn new(value: T, start: usize, end: usize) -> Self {
        Self { value, start, end }
    }

    /// Number of source bytes covered, used for underlines
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Replace the value, keeping the range
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(f(self.value), self.start, self.end)
    }
}

/// Offset of the tokenizer's current position in the source
pub(crate) fn offset(input: &Span<'_>) -> usize {
    input.location_offset()
}

/// Token covering the input consumed between `start` and `rest`
pub(crate) fn consumed<T>(start: &Span<'_>, rest: &Span<'_>, value: T) -> Spanned<T> {
    Spanned::new(value, offset(start), offset(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_and_map() {
        let token = Spanned::new("orders", 5, 11);
        assert_eq!(token.width(), 6);

        let mapped = token.map(str::to_uppercase);
        assert_eq!(mapped, Spanned::new("ORDERS".to_string(), 5, 11));
        assert_eq!(Spanned::new((), 3, 3).width(), 0);
    }
}
