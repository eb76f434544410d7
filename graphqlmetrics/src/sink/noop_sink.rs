use super::{Sink, SinkError};

/// A sink that accepts everything and delivers nothing.
///
/// Wire this in when usage reporting is disabled; the exporter and its callers
/// behave exactly as they would with a real destination.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl<T> Sink<T> for NoopSink
where
    T: Sync,
{
    async fn export(&self, _batch: &[T]) -> Result<(), SinkError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::sink::Sink;

    use super::NoopSink;

    #[test_log::test(tokio::test)]
    async fn always_succeeds() {
        let sink = NoopSink;
        assert!(Sink::<u32>::export(&sink, &[1, 2, 3]).await.is_ok());
        assert!(Sink::<u32>::export(&sink, &[]).await.is_ok());
        assert!(Sink::<u32>::close(&sink).await.is_ok());
    }
}
