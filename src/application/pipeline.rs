use crate::domain::envelope::Envelope;
use crate::domain::plugin::Step;
use crate::error::Result;

type Continuation<'a> = Box<dyn Fn(Envelope) -> Result<Envelope> + 'a>;

/// Runs validated steps in order against one envelope.
///
/// The chain is composed from the last step to the first: the last step's
/// `next` is the terminal action and every earlier step's `next` is the
/// continuation built so far. Errors from any step or from the terminal
/// action are returned as is.
pub struct Pipeline<'a> {
    steps: &'a [Step],
}

impl<'a> Pipeline<'a> {
    pub fn through(steps: &'a [Step]) -> Self {
        Self { steps }
    }

    /// Composes the chain around `terminal` and sends `envelope` through it.
    pub fn then<T>(&self, envelope: Envelope, terminal: T) -> Result<Envelope>
    where
        T: Fn(Envelope) -> Result<Envelope> + 'a,
    {
        let chain = self
            .steps
            .iter()
            .rev()
            .fold(Box::new(terminal) as Continuation<'a>, |next, step| {
                Box::new(move |envelope: Envelope| {
                    tracing::trace!(plugin = step.label(), "assembling");
                    step.invoke(envelope, &*next)
                }) as Continuation<'a>
            });

        chain(envelope)
    }
}
