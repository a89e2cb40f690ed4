//! Dotted / indexed paths into a JSON message: `a.b`, `files[2]`, `a["b c"]`.

use serde_json::{Map, Value};

use crate::errors::OpError;

/// Largest array index a path may name; `set` pads arrays up to it.
pub(crate) const MAX_INDEX: usize = 65_535;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MessagePath {
    raw: String,
    segments: Vec<Segment>,
}

impl MessagePath {
    pub(crate) fn parse(raw: &str) -> Result<Self, OpError> {
        let invalid = |reason: &str| OpError::InvalidValue {
            selector: raw.to_string(),
            reason: reason.to_string(),
        };
        if raw.is_empty() {
            return Err(invalid("empty message path"));
        }
        if raw.ends_with('.') {
            return Err(invalid("trailing '.'"));
        }

        let chars: Vec<char> = raw.chars().collect();
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    if current.is_empty() {
                        return Err(invalid("empty path segment"));
                    }
                    segments.push(Segment::Key(std::mem::take(&mut current)));
                    i += 1;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    } else if segments.is_empty() {
                        return Err(invalid("path cannot start with '['"));
                    }
                    i += 1;
                    if i < chars.len() && (chars[i] == '"' || chars[i] == '\'') {
                        let quote = chars[i];
                        i += 1;
                        let start = i;
                        while i < chars.len() && chars[i] != quote {
                            i += 1;
                        }
                        if i >= chars.len() {
                            return Err(invalid("unterminated quoted key"));
                        }
                        segments.push(Segment::Key(chars[start..i].iter().collect()));
                        i += 1;
                        if i >= chars.len() || chars[i] != ']' {
                            return Err(invalid("expected ']' after quoted key"));
                        }
                    } else {
                        let start = i;
                        while i < chars.len() && chars[i] != ']' {
                            i += 1;
                        }
                        if i >= chars.len() {
                            return Err(invalid("unterminated '['"));
                        }
                        let digits: String = chars[start..i].iter().collect();
                        let index = digits
                            .trim()
                            .parse::<usize>()
                            .map_err(|_| invalid("array index must be a non-negative integer"))?;
                        if index > MAX_INDEX {
                            return Err(invalid(&format!("array index {index} exceeds {MAX_INDEX}")));
                        }
                        segments.push(Segment::Index(index));
                    }
                    // skip ']' and an optional following '.'
                    i += 1;
                    if i < chars.len() && chars[i] == '.' {
                        i += 1;
                    }
                }
                c => {
                    current.push(c);
                    i += 1;
                }
            }
        }
        if !current.is_empty() {
            segments.push(Segment::Key(current));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub(crate) fn get<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.segments.iter().try_fold(root, |v, seg| match seg {
            Segment::Key(k) => v.get(k.as_str()),
            Segment::Index(i) => v.get(*i),
        })
    }

    /// Store `value` at this path, creating intermediate objects/arrays.
    pub(crate) fn set(&self, root: &mut Value, value: Value) -> Result<(), OpError> {
        let Some((last, parents)) = self.segments.split_last() else {
            return Err(self.not_container());
        };

        let mut cur = root;
        for (i, seg) in parents.iter().enumerate() {
            let next_is_index = matches!(self.segments[i + 1], Segment::Index(_));
            cur = self.child_mut(cur, seg, next_is_index)?;
        }

        match last {
            Segment::Key(k) => {
                if cur.is_null() {
                    *cur = Value::Object(Map::new());
                }
                let map = cur.as_object_mut().ok_or_else(|| self.not_container())?;
                map.insert(k.clone(), value);
            }
            Segment::Index(idx) => {
                if cur.is_null() {
                    *cur = Value::Array(Vec::new());
                }
                let arr = cur.as_array_mut().ok_or_else(|| self.not_container())?;
                self.pad_to(arr, *idx)?;
                arr[*idx] = value;
            }
        }
        Ok(())
    }

    fn child_mut<'v>(
        &self,
        v: &'v mut Value,
        seg: &Segment,
        next_is_index: bool,
    ) -> Result<&'v mut Value, OpError> {
        let empty = || {
            if next_is_index {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            }
        };
        let child = match seg {
            Segment::Key(k) => {
                if v.is_null() {
                    *v = Value::Object(Map::new());
                }
                let map = v.as_object_mut().ok_or_else(|| self.not_container())?;
                map.entry(k.clone()).or_insert(Value::Null)
            }
            Segment::Index(idx) => {
                if v.is_null() {
                    *v = Value::Array(Vec::new());
                }
                let arr = v.as_array_mut().ok_or_else(|| self.not_container())?;
                self.pad_to(arr, *idx)?;
                &mut arr[*idx]
            }
        };
        if child.is_null() {
            *child = empty();
        }
        Ok(child)
    }

    fn pad_to(&self, arr: &mut Vec<Value>, idx: usize) -> Result<(), OpError> {
        let len = idx
            .checked_add(1)
            .filter(|len| *len <= MAX_INDEX + 1)
            .ok_or_else(|| OpError::InvalidValue {
                selector: self.raw.clone(),
                reason: format!("array index {idx} exceeds {MAX_INDEX}"),
            })?;
        if arr.len() < len {
            arr.resize(len, Value::Null);
        }
        Ok(())
    }

    fn not_container(&self) -> OpError {
        OpError::InvalidValue {
            selector: self.raw.clone(),
            reason: "path crosses a value that is not an object or array".into(),
        }
    }
}
