//! Deprecation metadata attached to commands, groups, and arguments.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Custom renderer for a deprecation tag or message.
pub type DeprecationTextFn = Arc<dyn Fn(&DeprecationInfo) -> String + Send + Sync>;

/// Where a deprecation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeprecationKind {
    /// Declared directly on the command, group, or argument.
    Explicit,
    /// Inherited by a command from a deprecated ancestor group.
    Implicit,
}

/// Deprecation descriptor.
///
/// `tag_fn` and `message_fn` override the default renderings. They are
/// accessor hooks of the level they were declared at and are not carried
/// over when an implicit descriptor is derived from this one.
#[derive(Clone)]
pub struct DeprecationInfo {
    /// Explicit or implicit.
    pub kind: DeprecationKind,
    /// What is deprecated: `command`, `command group`, `argument`, `option`.
    pub object_type: String,
    /// Name of the deprecated object, e.g. `vm` or `--size`.
    pub target: String,
    /// Replacement to suggest.
    pub redirect: Option<String>,
    /// Hide the object from help output.
    pub hide: bool,
    /// Version in which the object will be removed.
    pub expiration: Option<String>,
    pub(crate) tag_fn: Option<DeprecationTextFn>,
    pub(crate) message_fn: Option<DeprecationTextFn>,
}

impl DeprecationInfo {
    /// Create an explicit deprecation for `target`.
    pub fn new(object_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: DeprecationKind::Explicit,
            object_type: object_type.into(),
            target: target.into(),
            redirect: None,
            hide: false,
            expiration: None,
            tag_fn: None,
            message_fn: None,
        }
    }

    /// Explicit deprecation of a command group.
    pub fn group(target: impl Into<String>) -> Self {
        Self::new("command group", target)
    }

    /// Explicit deprecation of a command.
    pub fn command(target: impl Into<String>) -> Self {
        Self::new("command", target)
    }

    /// Explicit deprecation of an option.
    pub fn option(target: impl Into<String>) -> Self {
        Self::new("option", target)
    }

    /// Suggest a replacement.
    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    /// Set the removal version.
    pub fn with_expiration(mut self, version: impl Into<String>) -> Self {
        self.expiration = Some(version.into());
        self
    }

    /// Hide the deprecated object from help.
    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }

    /// Override the tag rendering.
    pub fn with_tag_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&DeprecationInfo) -> String + Send + Sync + 'static,
    {
        self.tag_fn = Some(Arc::new(f));
        self
    }

    /// Override the message rendering.
    pub fn with_message_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&DeprecationInfo) -> String + Send + Sync + 'static,
    {
        self.message_fn = Some(Arc::new(f));
        self
    }

    /// Whether a custom tag or message renderer is attached.
    pub fn has_custom_rendering(&self) -> bool {
        self.tag_fn.is_some() || self.message_fn.is_some()
    }

    /// Short tag shown next to the object in help.
    pub fn tag(&self) -> String {
        if let Some(f) = &self.tag_fn {
            return f(self);
        }
        match self.kind {
            DeprecationKind::Explicit => "[Deprecated]".to_string(),
            DeprecationKind::Implicit => String::new(),
        }
    }

    /// Warning printed when the object is used.
    pub fn message(&self) -> String {
        if let Some(f) = &self.message_fn {
            return f(self);
        }
        let mut msg = match self.kind {
            DeprecationKind::Explicit => format!(
                "{} '{}' has been deprecated and will be removed ",
                capitalize(&self.object_type),
                self.target
            ),
            DeprecationKind::Implicit => format!(
                "This {} is implicitly deprecated because command group '{}' is deprecated \
                 and will be removed ",
                self.object_type, self.target
            ),
        };
        match &self.expiration {
            Some(version) => msg.push_str(&format!("in version '{}'.", version)),
            None => msg.push_str("in a future release."),
        }
        if let Some(redirect) = &self.redirect {
            msg.push_str(&format!(" Use '{}' instead.", redirect));
        }
        msg
    }

    /// Whether the removal version has been reached.
    pub fn is_expired(&self, current_version: &str) -> bool {
        match &self.expiration {
            Some(expiration) => {
                compare_versions(current_version, expiration) != Ordering::Less
            }
            None => false,
        }
    }
}

// Renderers are not comparable; equality covers the descriptive fields.
impl PartialEq for DeprecationInfo {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.object_type == other.object_type
            && self.target == other.target
            && self.redirect == other.redirect
            && self.hide == other.hide
            && self.expiration == other.expiration
    }
}

impl fmt::Debug for DeprecationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeprecationInfo")
            .field("kind", &self.kind)
            .field("object_type", &self.object_type)
            .field("target", &self.target)
            .field("redirect", &self.redirect)
            .field("hide", &self.hide)
            .field("expiration", &self.expiration)
            .field("custom_tag", &self.tag_fn.is_some())
            .field("custom_message", &self.message_fn.is_some())
            .finish()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Compare dotted versions numerically; non-numeric parts count as zero.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| {
                part.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0)
            })
            .collect()
    };
    let (mut a, mut b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    a.resize(len, 0);
    b.resize(len, 0);
    a.cmp(&b)
}
