//! Ordered body transforms with a per-document context.

use std::borrow::Cow;

use crate::{ConversionWarning, Diagnostics, SourceLocation};

/// Per-document facts and findings threaded through every transform.
///
/// Built fresh for each document; never shared between documents.
#[derive(Debug, Default)]
pub struct TransformContext<'d> {
    /// Source-relative path of the document, for diagnostics.
    pub path: Option<&'d str>,
    /// Final frontmatter title, when known.
    pub title: Option<&'d str>,
    /// Warnings collected so far.
    pub diagnostics: Diagnostics,
}

impl<'d> TransformContext<'d> {
    /// Context for a document at `path` with an optional title.
    pub fn new(path: Option<&'d str>, title: Option<&'d str>) -> Self {
        Self {
            path,
            title,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Location inside the current document.
    pub fn location(&self, line: usize) -> SourceLocation {
        match self.path {
            Some(path) => SourceLocation::with_file(path.to_string(), line),
            None => SourceLocation::new(line),
        }
    }

    /// Records a warning.
    pub fn warn(&mut self, warning: ConversionWarning) {
        self.diagnostics.add_warning(warning);
    }
}

/// A whole-body text rewrite.
pub trait TextTransform {
    /// Transform the input text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str, cx: &mut TransformContext<'_>) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    fn transform<'a>(&self, input: &'a str, _cx: &mut TransformContext<'_>) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Ordered chain of body transforms; each one sees the previous output.
#[derive(Default)]
pub struct BodyPipeline {
    transforms: Vec<Box<dyn TextTransform + Send + Sync>>,
}

impl BodyPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Append a transform.
    pub fn add_transform<T: TextTransform + Send + Sync + 'static>(&mut self, transform: T) {
        self.transforms.push(Box::new(transform));
    }

    /// Builder-style [`BodyPipeline::add_transform`].
    pub fn with<T: TextTransform + Send + Sync + 'static>(mut self, transform: T) -> Self {
        self.add_transform(transform);
        self
    }

    /// Number of transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// True when no transform is registered.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Run every transform in order.
    pub fn run(&self, input: &str, cx: &mut TransformContext<'_>) -> String {
        let mut current = Cow::Borrowed(input);
        for transform in &self.transforms {
            let next = transform.transform(current.as_ref(), cx).into_owned();
            current = Cow::Owned(next);
        }
        current.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.to_uppercase())
    }

    fn exclaim(input: &str) -> Cow<'_, str> {
        Cow::Owned(format!("{input}!"))
    }

    struct NoteTitle;

    impl TextTransform for NoteTitle {
        fn transform<'a>(&self, input: &'a str, cx: &mut TransformContext<'_>) -> Cow<'a, str> {
            match cx.title {
                Some(title) => Cow::Owned(format!("{title}: {input}")),
                None => Cow::Borrowed(input),
            }
        }
    }

    #[test]
    fn runs_in_order() {
        let pipeline = BodyPipeline::new().with(shout).with(exclaim);
        let mut cx = TransformContext::default();
        assert_eq!(pipeline.run("hi", &mut cx), "HI!");
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn transforms_see_context() {
        let pipeline = BodyPipeline::new().with(NoteTitle).with(exclaim);
        let mut cx = TransformContext::new(Some("a.md"), Some("Setup"));
        assert_eq!(pipeline.run("body", &mut cx), "Setup: body!");
        assert_eq!(cx.location(4).to_string(), "a.md:4");
    }
}
