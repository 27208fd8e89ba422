//! Input helpers shared by every dialog: secret fields with a visibility
//! toggle and a focus ring for moving between fields.
//!

/// A password input that renders masked until revealed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecretField {
    value: String,
    visible: bool,
}

impl SecretField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// What the field shows on screen.
    pub fn display(&self) -> String {
        if self.visible {
            self.value.clone()
        } else {
            "*".repeat(self.value.chars().count())
        }
    }
}

/// Cyclic focus over `len` fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusRing {
    len: usize,
    index: usize,
}

impl FocusRing {
    pub fn new(len: usize) -> Self {
        Self { len: len.max(1), index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_focused(&self, i: usize) -> bool {
        self.index == i
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.len;
    }

    pub fn prev(&mut self) {
        self.index = (self.index + self.len - 1) % self.len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_field_masks_until_revealed() {
        let mut f = SecretField::default();
        for c in "pässw".chars() {
            f.push(c);
        }
        assert_eq!(f.display(), "*****");
        f.set_visible(true);
        assert_eq!(f.display(), "pässw");
        f.pop();
        assert_eq!(f.value(), "päss");
    }

    #[test]
    fn focus_ring_wraps() {
        let mut r = FocusRing::new(2);
        r.prev();
        assert_eq!(r.index(), 1);
        r.next();
        assert!(r.is_focused(0));
    }
}
