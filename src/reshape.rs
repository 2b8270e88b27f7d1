//! Contextual letter-form reshaping for Arabic-script text.
//!
//! Fonts measured and rasterised without a shaping engine draw each code point's nominal
//! (isolated) glyph. To get connected script we substitute each letter with its Unicode
//! presentation form (isolated, final, initial or medial) according to its neighbours, and
//! fold lam + alef pairs into their mandatory ligatures.

/// Presentation forms for one letter: `[isolated, final, initial, medial]`.
///
/// Right-joining letters have no initial/medial forms.
#[derive(Clone, Copy)]
struct Forms {
    isolated: char,
    fin: char,
    initial: Option<char>,
    medial: Option<char>,
}

const fn dual(isolated: char, fin: char, initial: char, medial: char) -> Forms {
    Forms {
        isolated,
        fin,
        initial: Some(initial),
        medial: Some(medial),
    }
}

const fn right(isolated: char, fin: char) -> Forms {
    Forms {
        isolated,
        fin,
        initial: None,
        medial: None,
    }
}

const HAMZA: char = '\u{0621}';
const LAM: char = '\u{0644}';
const TATWEEL: char = '\u{0640}';

fn forms(c: char) -> Option<Forms> {
    let f = match c {
        '\u{0621}' => right('\u{FE80}', '\u{FE80}'),
        '\u{0622}' => right('\u{FE81}', '\u{FE82}'),
        '\u{0623}' => right('\u{FE83}', '\u{FE84}'),
        '\u{0624}' => right('\u{FE85}', '\u{FE86}'),
        '\u{0625}' => right('\u{FE87}', '\u{FE88}'),
        '\u{0626}' => dual('\u{FE89}', '\u{FE8A}', '\u{FE8B}', '\u{FE8C}'),
        '\u{0627}' => right('\u{FE8D}', '\u{FE8E}'),
        '\u{0628}' => dual('\u{FE8F}', '\u{FE90}', '\u{FE91}', '\u{FE92}'),
        '\u{0629}' => right('\u{FE93}', '\u{FE94}'),
        '\u{062A}' => dual('\u{FE95}', '\u{FE96}', '\u{FE97}', '\u{FE98}'),
        '\u{062B}' => dual('\u{FE99}', '\u{FE9A}', '\u{FE9B}', '\u{FE9C}'),
        '\u{062C}' => dual('\u{FE9D}', '\u{FE9E}', '\u{FE9F}', '\u{FEA0}'),
        '\u{062D}' => dual('\u{FEA1}', '\u{FEA2}', '\u{FEA3}', '\u{FEA4}'),
        '\u{062E}' => dual('\u{FEA5}', '\u{FEA6}', '\u{FEA7}', '\u{FEA8}'),
        '\u{062F}' => right('\u{FEA9}', '\u{FEAA}'),
        '\u{0630}' => right('\u{FEAB}', '\u{FEAC}'),
        '\u{0631}' => right('\u{FEAD}', '\u{FEAE}'),
        '\u{0632}' => right('\u{FEAF}', '\u{FEB0}'),
        '\u{0633}' => dual('\u{FEB1}', '\u{FEB2}', '\u{FEB3}', '\u{FEB4}'),
        '\u{0634}' => dual('\u{FEB5}', '\u{FEB6}', '\u{FEB7}', '\u{FEB8}'),
        '\u{0635}' => dual('\u{FEB9}', '\u{FEBA}', '\u{FEBB}', '\u{FEBC}'),
        '\u{0636}' => dual('\u{FEBD}', '\u{FEBE}', '\u{FEBF}', '\u{FEC0}'),
        '\u{0637}' => dual('\u{FEC1}', '\u{FEC2}', '\u{FEC3}', '\u{FEC4}'),
        '\u{0638}' => dual('\u{FEC5}', '\u{FEC6}', '\u{FEC7}', '\u{FEC8}'),
        '\u{0639}' => dual('\u{FEC9}', '\u{FECA}', '\u{FECB}', '\u{FECC}'),
        '\u{063A}' => dual('\u{FECD}', '\u{FECE}', '\u{FECF}', '\u{FED0}'),
        '\u{0641}' => dual('\u{FED1}', '\u{FED2}', '\u{FED3}', '\u{FED4}'),
        '\u{0642}' => dual('\u{FED5}', '\u{FED6}', '\u{FED7}', '\u{FED8}'),
        '\u{0643}' => dual('\u{FED9}', '\u{FEDA}', '\u{FEDB}', '\u{FEDC}'),
        '\u{0644}' => dual('\u{FEDD}', '\u{FEDE}', '\u{FEDF}', '\u{FEE0}'),
        '\u{0645}' => dual('\u{FEE1}', '\u{FEE2}', '\u{FEE3}', '\u{FEE4}'),
        '\u{0646}' => dual('\u{FEE5}', '\u{FEE6}', '\u{FEE7}', '\u{FEE8}'),
        '\u{0647}' => dual('\u{FEE9}', '\u{FEEA}', '\u{FEEB}', '\u{FEEC}'),
        '\u{0648}' => right('\u{FEED}', '\u{FEEE}'),
        '\u{0649}' => right('\u{FEEF}', '\u{FEF0}'),
        '\u{064A}' => dual('\u{FEF1}', '\u{FEF2}', '\u{FEF3}', '\u{FEF4}'),
        // Persian and Urdu additions.
        '\u{067E}' => dual('\u{FB56}', '\u{FB57}', '\u{FB58}', '\u{FB59}'),
        '\u{0686}' => dual('\u{FB7A}', '\u{FB7B}', '\u{FB7C}', '\u{FB7D}'),
        '\u{0698}' => right('\u{FB8A}', '\u{FB8B}'),
        '\u{06A9}' => dual('\u{FB8E}', '\u{FB8F}', '\u{FB90}', '\u{FB91}'),
        '\u{06AF}' => dual('\u{FB92}', '\u{FB93}', '\u{FB94}', '\u{FB95}'),
        '\u{06CC}' => dual('\u{FBFC}', '\u{FBFD}', '\u{FBFE}', '\u{FBFF}'),
        _ => return None,
    };
    Some(f)
}

/// Lam-alef ligature `(isolated, final)` for a lam followed by `alef`.
fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

/// Combining marks (harakat) are transparent to joining.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

/// Whether `c` connects to the letter after it.
fn joins_forward(c: char) -> bool {
    c == TATWEEL || forms(c).is_some_and(|f| f.initial.is_some())
}

/// Whether `c` connects to the letter before it. Hamza never joins.
fn joins_backward(c: char) -> bool {
    c == TATWEEL || (c != HAMZA && forms(c).is_some())
}

/// Replace Arabic-script letters in `text` with their contextual presentation forms.
///
/// Characters outside the reshaping table (Latin, digits, ZWNJ, spaces) pass through and break
/// joining on both sides.
pub fn reshape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    let prev_joining = |i: usize| -> bool {
        chars[..i]
            .iter()
            .rev()
            .find(|c| !is_transparent(**c))
            .is_some_and(|c| joins_forward(*c))
    };
    let next_index = |i: usize| -> Option<usize> {
        (i + 1..chars.len()).find(|&j| !is_transparent(chars[j]))
    };

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let Some(f) = forms(c) else {
            out.push(c);
            i += 1;
            continue;
        };

        let connects_prev = prev_joining(i);
        let next = next_index(i);

        if c == LAM {
            if let Some(j) = next {
                if let Some((iso, fin)) = lam_alef(chars[j]) {
                    out.push(if connects_prev { fin } else { iso });
                    // Keep any marks sitting between lam and alef.
                    out.extend(&chars[i + 1..j]);
                    i = j + 1;
                    continue;
                }
            }
        }

        let connects_next = f.initial.is_some() && next.is_some_and(|j| joins_backward(chars[j]));
        let shaped = match (connects_prev, connects_next) {
            (true, true) => f.medial.unwrap_or(f.fin),
            (true, false) => f.fin,
            (false, true) => f.initial.unwrap_or(f.isolated),
            (false, false) => f.isolated,
        };
        out.push(shaped);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_passes_through() {
        assert_eq!(reshape("hello, world"), "hello, world");
    }

    #[test]
    fn single_letter_is_isolated() {
        assert_eq!(reshape("\u{0628}"), "\u{FE8F}");
    }

    #[test]
    fn dual_joining_run_uses_initial_medial_final() {
        // بتب -> beh initial, teh medial, beh final
        assert_eq!(reshape("\u{0628}\u{062A}\u{0628}"), "\u{FE91}\u{FE98}\u{FE90}");
    }

    #[test]
    fn right_joining_letter_breaks_the_run() {
        // روم: reh isolated (nothing before it), waw isolated (reh does not join forward),
        // meem isolated (waw does not join forward).
        assert_eq!(
            reshape("\u{0631}\u{0648}\u{0645}"),
            "\u{FEAD}\u{FEED}\u{FEE1}"
        );
    }

    #[test]
    fn persian_mi_prefix() {
        // می: meem initial, farsi yeh final
        assert_eq!(reshape("\u{0645}\u{06CC}"), "\u{FEE3}\u{FBFD}");
    }

    #[test]
    fn lam_alef_becomes_ligature() {
        // لا -> isolated ligature; بلا -> beh initial + final ligature
        assert_eq!(reshape("\u{0644}\u{0627}"), "\u{FEFB}");
        assert_eq!(reshape("\u{0628}\u{0644}\u{0627}"), "\u{FE91}\u{FEFC}");
    }

    #[test]
    fn harakat_are_transparent() {
        // بَب: the fatha does not break the join
        assert_eq!(reshape("\u{0628}\u{064E}\u{0628}"), "\u{FE91}\u{064E}\u{FE90}");
    }

    #[test]
    fn zwnj_breaks_joining() {
        // می‌ب: yeh before ZWNJ is final, beh after it is isolated
        assert_eq!(
            reshape("\u{0645}\u{06CC}\u{200C}\u{0628}"),
            "\u{FEE3}\u{FBFD}\u{200C}\u{FE8F}"
        );
    }
}
