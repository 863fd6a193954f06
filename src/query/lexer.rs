/// Split a query into raw tokens.
///
/// - whitespace separates tokens
/// - `(` and `)` are always tokens of their own
/// - `"` starts a quoted token running to the next `"` (or end of input);
///   the quotes are dropped, inner whitespace is kept
/// - anything else runs until whitespace or a parenthesis
///
/// No escaping, no classification: `AND` and `"AND"` come out the same.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        match chars[i] {
            c if c.is_whitespace() => {
                i += 1;
            }
            '(' | ')' => {
                tokens.push(chars[i].to_string());
                i += 1;
            }
            '"' => {
                i += 1;
                tokens.push(read_quoted(&chars, &mut i));
            }
            _ => {
                tokens.push(read_word(&chars, &mut i));
            }
        }
    }

    tokens
}

fn read_quoted(chars: &[char], i: &mut usize) -> String {
    let mut s = String::new();
    while *i < chars.len() && chars[*i] != '"' {
        s.push(chars[*i]);
        *i += 1;
    }
    // skip closing quote (no-op when unterminated)
    *i += 1;
    s
}

fn read_word(chars: &[char], i: &mut usize) -> String {
    let mut word = String::new();
    while *i < chars.len() {
        match chars[*i] {
            c if c.is_whitespace() => break,
            '(' | ')' => break,
            c => {
                word.push(c);
                *i += 1;
            }
        }
    }
    word
}
