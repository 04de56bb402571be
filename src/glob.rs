//! Compile precompile glob patterns into anchored matchers over logical paths.
//!
//! The dialect is loose: `*` crosses directory separators, so `*.js` matches
//! both `app.js` and `vendor/app.js`. `**` consumes whole leading segments and swallows one
//! trailing `/`. Every match must begin at the start of the path or directly after a `/`
//! and run to the end of the path.

use regex::Regex;

use crate::error::AssetError;

const START_OF_FILENAME: &str = r"(?:\A|/)";
const END_OF_STRING: &str = r"\z";

/// A glob pattern compiled into an anchored regular expression.
#[derive(Debug, Clone)]
pub struct CompiledGlob {
  pattern: String,
  regex: Regex,
}

impl CompiledGlob {
  /// The glob source this matcher was compiled from.
  pub fn pattern(&self) -> &str {
    &self.pattern
  }

  /// Returns `true` when the path satisfies the glob.
  pub fn test(&self, path: &str) -> bool {
    self.regex.is_match(path)
  }
}

/// Compile a glob pattern into a [`CompiledGlob`].
///
/// Fails with [`AssetError::InvalidGlob`] when the translated expression is not valid, which
/// in practice means an unbalanced `{`.
pub fn compile_glob(pattern: &str) -> Result<CompiledGlob, AssetError> {
  let source = if pattern.is_empty() {
    format!(r"\A{END_OF_STRING}")
  } else {
    format!(
      "{START_OF_FILENAME}{}{END_OF_STRING}",
      translate(&tokenize(pattern))
    )
  };

  let regex = Regex::new(&source).map_err(|err| AssetError::InvalidGlob {
    pattern: pattern.to_string(),
    source: err,
  })?;

  Ok(CompiledGlob {
    pattern: pattern.to_string(),
    regex,
  })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
  DoubleStar,
  Escaped(char),
  Char(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
  let mut chars = pattern.chars().peekable();
  let mut tokens = Vec::new();

  while let Some(c) = chars.next() {
    match c {
      // A trailing backslash stands for itself.
      '\\' => tokens.push(Token::Escaped(chars.next().unwrap_or('\\'))),
      '*' if chars.peek() == Some(&'*') => {
        chars.next();
        if chars.peek() == Some(&'/') {
          chars.next();
        }
        tokens.push(Token::DoubleStar);
      }
      other => tokens.push(Token::Char(other)),
    }
  }

  tokens
}

fn translate(tokens: &[Token]) -> String {
  let mut out = String::new();
  let mut depth = 0usize;

  for token in tokens {
    let c = match *token {
      Token::DoubleStar => {
        out.push_str("(?:[^/]+/)*");
        continue;
      }
      Token::Escaped(c) => {
        push_literal(&mut out, c);
        continue;
      }
      Token::Char(c) => c,
    };

    match c {
      '*' => out.push_str(".*"),
      '?' => out.push('.'),
      '{' => {
        depth += 1;
        out.push_str("(?:");
      }
      '}' if depth > 0 => {
        depth -= 1;
        out.push(')');
      }
      ',' if depth > 0 => out.push('|'),
      other => push_literal(&mut out, other),
    }
  }

  out
}

fn push_literal(out: &mut String, c: char) {
  out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
}
