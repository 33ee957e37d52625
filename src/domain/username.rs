use unicode_segmentation::UnicodeSegmentation;

const MAX_LENGTH: usize = 64;
const FORBIDDEN_CHARACTERS: [char; 9] = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];

#[derive(Debug, Clone)]
pub struct Username(String);

impl Username {
    pub fn parse(s: String) -> Result<Username, String> {
        let s = s.trim().to_string();

        let is_empty = s.is_empty();
        let is_too_long = s.graphemes(true).count() > MAX_LENGTH;
        let contains_forbidden_characters = s.chars().any(|c| FORBIDDEN_CHARACTERS.contains(&c));

        if is_empty || is_too_long || contains_forbidden_characters {
            Err(format!("{} is not a valid username", s))
        } else {
            Ok(Self(s))
        }
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
