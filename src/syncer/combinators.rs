//! The [`Syncer`] trait and its structural combinators.

use crate::position::PathPart;
use crate::syncer::context::SyncContext;
use std::marker::PhantomData;

/// A bidirectional mapping between one slice of a document and a value.
///
/// `deserialize` receives the previous input so a syncer rewrites only the
/// part of it that it owns and hands everything else back untouched.
pub trait Syncer {
    type Input;
    type Output;

    fn serialize(&self, input: &Self::Input, ctx: &mut SyncContext) -> Self::Output;

    fn deserialize(&self, output: &Self::Output, previous: &Self::Input) -> Self::Input;
}

impl<S: Syncer + ?Sized> Syncer for Box<S> {
    type Input = S::Input;
    type Output = S::Output;

    fn serialize(&self, input: &Self::Input, ctx: &mut SyncContext) -> Self::Output {
        (**self).serialize(input, ctx)
    }

    fn deserialize(&self, output: &Self::Output, previous: &Self::Input) -> Self::Input {
        (**self).deserialize(output, previous)
    }
}

/// Two syncers run in sequence.
///
/// Serialization runs `first` then `second`; deserialization walks back
/// through `second` then `first`, re-reading the previous input so each stage
/// sees its own previous value.
#[derive(Debug, Clone)]
pub struct Pipe<A, B> {
    first: A,
    second: B,
}

pub fn pipe<A, B>(first: A, second: B) -> Pipe<A, B>
where
    A: Syncer,
    B: Syncer<Input = A::Output>,
{
    Pipe { first, second }
}

impl<A, B> Syncer for Pipe<A, B>
where
    A: Syncer,
    B: Syncer<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    fn serialize(&self, input: &A::Input, ctx: &mut SyncContext) -> B::Output {
        let middle = self.first.serialize(input, ctx);
        self.second.serialize(&middle, ctx)
    }

    fn deserialize(&self, output: &B::Output, previous: &A::Input) -> A::Input {
        let previous_middle = self.first.serialize(previous, &mut SyncContext::new());
        let middle = self.second.deserialize(output, &previous_middle);
        self.first.deserialize(&middle, previous)
    }
}

/// Applies a syncer to every item of a list, entering `Index(i)` per item.
#[derive(Debug, Clone)]
pub struct Each<S> {
    item: S,
}

pub fn each<S: Syncer>(item: S) -> Each<S> {
    Each { item }
}

impl<S> Syncer for Each<S>
where
    S: Syncer,
    S::Input: Clone + Default,
{
    type Input = Vec<S::Input>;
    type Output = Vec<S::Output>;

    fn serialize(&self, input: &Vec<S::Input>, ctx: &mut SyncContext) -> Vec<S::Output> {
        input
            .iter()
            .enumerate()
            .map(|(index, item)| {
                ctx.scoped(|ctx| {
                    ctx.enter(PathPart::Index(index));
                    self.item.serialize(item, ctx)
                })
            })
            .collect()
    }

    fn deserialize(&self, output: &Vec<S::Output>, previous: &Vec<S::Input>) -> Vec<S::Input> {
        output
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let previous_item = previous.get(index).cloned().unwrap_or_default();
                self.item.deserialize(item, &previous_item)
            })
            .collect()
    }
}

/// Turns a missing value into the type's default plus an error diagnostic.
#[derive(Debug, Clone)]
pub struct Required<S> {
    inner: S,
    message: String,
}

impl<S, T> Syncer for Required<S>
where
    S: Syncer<Output = Option<T>>,
    T: Clone + Default + PartialEq,
{
    type Input = S::Input;
    type Output = T;

    fn serialize(&self, input: &S::Input, ctx: &mut SyncContext) -> T {
        match self.inner.serialize(input, ctx) {
            Some(value) => value,
            None => {
                ctx.error(self.message.clone());
                T::default()
            }
        }
    }

    fn deserialize(&self, output: &T, previous: &S::Input) -> S::Input {
        let was_missing = self
            .inner
            .serialize(previous, &mut SyncContext::new())
            .is_none();
        if was_missing && *output == T::default() {
            return self.inner.deserialize(&None, previous);
        }
        self.inner.deserialize(&Some(output.clone()), previous)
    }
}

/// A syncer defined by a forward and a backward function.
pub struct FnSyncer<I, O, F, G> {
    forward: F,
    backward: G,
    _types: PhantomData<fn(I) -> O>,
}

pub fn map<I, O, F, G>(forward: F, backward: G) -> FnSyncer<I, O, F, G>
where
    F: Fn(&I, &mut SyncContext) -> O,
    G: Fn(&O, &I) -> I,
{
    FnSyncer {
        forward,
        backward,
        _types: PhantomData,
    }
}

impl<I, O, F, G> Syncer for FnSyncer<I, O, F, G>
where
    F: Fn(&I, &mut SyncContext) -> O,
    G: Fn(&O, &I) -> I,
{
    type Input = I;
    type Output = O;

    fn serialize(&self, input: &I, ctx: &mut SyncContext) -> O {
        (self.forward)(input, ctx)
    }

    fn deserialize(&self, output: &O, previous: &I) -> I {
        (self.backward)(output, previous)
    }
}

pub trait SyncerExt: Syncer + Sized {
    /// Chain `next` after this syncer.
    fn then<B>(self, next: B) -> Pipe<Self, B>
    where
        B: Syncer<Input = Self::Output>,
    {
        pipe(self, next)
    }

    /// Report `message` and fall back to a default when this yields `None`.
    fn required<T>(self, message: impl Into<String>) -> Required<Self>
    where
        Self: Syncer<Output = Option<T>>,
    {
        Required {
            inner: self,
            message: message.into(),
        }
    }

    fn boxed(self) -> Box<dyn Syncer<Input = Self::Input, Output = Self::Output>>
    where
        Self: 'static,
    {
        Box::new(self)
    }

    /// Read with a fresh context.
    fn read(&self, input: &Self::Input) -> crate::syncer::SyncResult<Self::Output> {
        let mut ctx = SyncContext::new();
        let value = ctx.scoped(|ctx| self.serialize(input, ctx));
        ctx.finish(value)
    }
}

impl<S: Syncer + Sized> SyncerExt for S {}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubled() -> impl Syncer<Input = i64, Output = i64> {
        map(|n: &i64, _: &mut SyncContext| n * 2, |n: &i64, _: &i64| n / 2)
    }

    fn stringified() -> impl Syncer<Input = i64, Output = String> {
        map(
            |n: &i64, _: &mut SyncContext| n.to_string(),
            |s: &String, previous: &i64| s.parse().unwrap_or(*previous),
        )
    }

    #[test]
    fn test_pipe_both_directions() {
        let syncer = doubled().then(stringified());
        assert_eq!(syncer.read(&21).value, "42");
        assert_eq!(syncer.deserialize(&"10".to_string(), &21), 5);
    }

    #[test]
    fn test_pipe_deserialize_sees_previous_middle() {
        let syncer = doubled().then(stringified());
        // Unparseable output falls back to the previous middle value (42).
        assert_eq!(syncer.deserialize(&"nope".to_string(), &21), 21);
    }

    #[test]
    fn test_each_enters_index() {
        let syncer = each(map(
            |n: &i64, ctx: &mut SyncContext| {
                if *n < 0 {
                    ctx.warning("negative");
                }
                *n
            },
            |n: &i64, _: &i64| *n,
        ));
        let result = syncer.read(&vec![1, -1]);
        assert_eq!(result.value, vec![1, -1]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].path.to_string(), "/[1]");
    }

    #[test]
    fn test_required_defaults_and_reports() {
        let syncer = map(
            |n: &Option<i64>, _: &mut SyncContext| *n,
            |n: &Option<i64>, _: &Option<i64>| *n,
        )
        .required("value is required");

        let result = syncer.read(&None);
        assert_eq!(result.value, 0);
        assert_eq!(result.diagnostics[0].message, "value is required");

        // Writing the default back into a missing value keeps it missing.
        assert_eq!(syncer.deserialize(&0, &None), None);
        assert_eq!(syncer.deserialize(&3, &None), Some(3));
    }
}
