//! Path decomposition over decoded code points.
//!
//! Components retain their trailing separator so that concatenating them
//! round-trips to the original path. No normalization is performed.

use crate::strings::CodePoint;

#[inline]
pub fn is_path_separator(c: CodePoint) -> bool {
    if cfg!(windows) {
        c == '/' as CodePoint || c == '\\' as CodePoint
    } else {
        c == '/' as CodePoint
    }
}

#[inline]
pub fn is_extension_separator(c: CodePoint) -> bool {
    c == '.' as CodePoint
}

/// Index of the first character after the last separator, or 0 if none.
pub fn basename_start(chars: &[CodePoint]) -> usize {
    chars
        .iter()
        .rposition(|&c| is_path_separator(c))
        .map_or(0, |i| i + 1)
}

/// Splits `chars` into component spans `(begin, end)`. Components include
/// their trailing separator; an empty trailing remainder is dropped.
pub fn component_spans(chars: &[CodePoint], out: &mut Vec<(usize, usize)>) {
    let mut begin = 0;
    for (i, &c) in chars.iter().enumerate() {
        if is_path_separator(c) {
            out.push((begin, i + 1));
            begin = i + 1;
        }
    }
    if begin < chars.len() {
        out.push((begin, chars.len()));
    }
}

/// Distance between two decoded paths: the number of separators in each
/// path past their longest common prefix, plus 1 if they differ at all.
pub fn path_distance(a: &[CodePoint], b: &[CodePoint]) -> usize {
    let common = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    if common == a.len() && common == b.len() {
        return 0;
    }
    let seps = |s: &[CodePoint]| s.iter().filter(|&&c| is_path_separator(c)).count();
    1 + seps(&a[common..]) + seps(&b[common..])
}

/// Start of the extension inside a basename: the index of the last
/// extension separator, or `len` if there is none. A leading separator
/// (dotfile) does not start an extension.
pub fn extension_start(basename: &[CodePoint]) -> usize {
    match basename
        .iter()
        .enumerate()
        .skip(1)
        .rev()
        .find(|(_, &c)| is_extension_separator(c))
    {
        Some((i, _)) => i,
        None => basename.len(),
    }
}
