// pipeline.rs - Named transform stages over a shared buffer
//
// Stages run in the order they were added. Each one sees the buffer as the
// previous stage left it.

use crate::event::handler_list::HandlerList;
use crate::event::Subscription;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

struct Stage<B> {
    name: Cow<'static, str>,
    apply: Box<dyn Fn(&mut B) + Send + Sync>,
}

/// Chain of transforms applied to a mutable buffer before its consumer
/// reads it.
///
/// The buffer must stay valid for the whole of [`run`](Pipeline::run); it is
/// passed by `&mut` so the borrow checker enforces this.
pub struct Pipeline<B> {
    stages: HandlerList<Stage<B>>,
}

impl<B> Pipeline<B> {
    pub const fn new() -> Self {
        Self {
            stages: HandlerList::new(),
        }
    }

    pub fn add_stage<F>(&self, name: impl Into<Cow<'static, str>>, apply: F) -> Subscription
    where
        F: Fn(&mut B) + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::trace!(stage = %name, "pipeline stage added");
        self.stages.push(Arc::new(Stage {
            name,
            apply: Box::new(apply),
        }))
    }

    pub fn remove_stage(&self, stage: Subscription) -> bool {
        match self.stages.remove(stage) {
            Some(removed) => {
                tracing::trace!(stage = %removed.name, "pipeline stage removed");
                true
            }
            None => false,
        }
    }

    /// Apply every stage to `buffer` in order. Returns the number of stages run.
    pub fn run(&self, buffer: &mut B) -> usize {
        let stages = self.stages.snapshot();
        for stage in &stages {
            tracing::trace!(stage = %stage.name, "running pipeline stage");
            (stage.apply)(buffer);
        }
        stages.len()
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages
            .snapshot()
            .iter()
            .map(|stage| stage.name.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<B> Default for Pipeline<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Pipeline<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_transform_in_order() {
        let pipeline: Pipeline<String> = Pipeline::new();
        pipeline.add_stage("trim", |text| *text = text.trim().to_string());
        pipeline.add_stage("upper", |text| *text = text.to_uppercase());
        pipeline.add_stage("suffix", |text| text.push('!'));

        let mut text = "  hello ".to_string();
        assert_eq!(pipeline.run(&mut text), 3);
        assert_eq!(text, "HELLO!");
        assert_eq!(pipeline.stage_names(), vec!["trim", "upper", "suffix"]);
    }

    #[test]
    fn test_stage_token_from_other_pipeline_ignored() {
        let first: Pipeline<String> = Pipeline::new();
        let second: Pipeline<String> = Pipeline::new();
        let token = first.add_stage("a", |text| text.push('a'));
        second.add_stage("b", |text| text.push('b'));

        assert!(!second.remove_stage(token));
        assert_eq!(second.stage_names(), vec!["b"]);
        assert!(first.remove_stage(token));
    }

    #[test]
    fn test_remove_stage() {
        let pipeline: Pipeline<Vec<u8>> = Pipeline::default();
        pipeline.add_stage("header", |buf| {
            let mut framed = b"--\n".to_vec();
            framed.append(buf);
            *buf = framed;
        });
        let footer = pipeline.add_stage("footer", |buf| buf.extend_from_slice(b"\n--"));

        assert!(pipeline.remove_stage(footer));
        assert!(!pipeline.remove_stage(footer));

        let mut buf = b"body".to_vec();
        pipeline.run(&mut buf);
        assert_eq!(buf, b"--\nbody");
        assert_eq!(pipeline.len(), 1);
    }
}
