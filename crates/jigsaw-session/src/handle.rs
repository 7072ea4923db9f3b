//! The command side of a session.

use jigsaw_protocol::{CombinePieces, Outbound, PiecePosition};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::SessionError;

/// A cloneable handle for issuing piece commands to a running session.
///
/// Commands are queued without blocking and written in the order they were
/// queued. The server sends no acknowledgement; the effect of a command is
/// only visible in later room broadcasts.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    outbound: mpsc::UnboundedSender<Outbound>,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub(crate) fn new(
        outbound: mpsc::UnboundedSender<Outbound>,
        cancel: CancellationToken,
    ) -> Self {
        Self { outbound, cancel }
    }

    /// Grabs a piece at board position `(x, y)`.
    pub fn pick_up_piece(&self, id: u16, x: f32, y: f32) -> Result<(), SessionError> {
        self.enqueue(Outbound::PickUp(PiecePosition { id, x, y }))
    }

    /// Drags a held piece to `(x, y)`.
    pub fn move_piece(&self, id: u16, x: f32, y: f32) -> Result<(), SessionError> {
        self.enqueue(Outbound::Move(PiecePosition { id, x, y }))
    }

    /// Releases a held piece at `(x, y)`.
    pub fn put_down_piece(&self, id: u16, x: f32, y: f32) -> Result<(), SessionError> {
        self.enqueue(Outbound::PutDown(PiecePosition { id, x, y }))
    }

    /// Merges the group holding `second_id` into the group holding
    /// `first_id`, placing the result at `(x, y)`.
    pub fn combine_pieces(
        &self,
        first_id: u16,
        second_id: u16,
        x: f32,
        y: f32,
    ) -> Result<(), SessionError> {
        self.enqueue(Outbound::Combine(CombinePieces {
            first_id,
            second_id,
            x,
            y,
        }))
    }

    /// Ends the session. Idempotent.
    ///
    /// Both session tasks stop at their next wake-up; anything still queued
    /// is dropped.
    pub fn exit(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!("session exit requested");
        }
        self.cancel.cancel();
    }

    /// Returns `true` once the session has ended for any reason.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits until the session has ended.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    pub(crate) fn enqueue(&self, msg: Outbound) -> Result<(), SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Closed);
        }
        self.outbound.send(msg).map_err(|_| SessionError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (SessionHandle, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SessionHandle::new(tx, CancellationToken::new()), rx)
    }

    #[test]
    fn test_commands_are_queued_in_order() {
        let (handle, mut rx) = handle();
        handle.pick_up_piece(4, 1.0, 2.0).unwrap();
        handle.move_piece(4, 3.0, 4.0).unwrap();
        handle.put_down_piece(4, 5.0, 6.0).unwrap();
        handle.combine_pieces(1, 4, 7.0, 8.0).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::PickUp(PiecePosition { id: 4, x: 1.0, y: 2.0 })
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::Move(PiecePosition { id: 4, x: 3.0, y: 4.0 })
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::PutDown(PiecePosition { id: 4, x: 5.0, y: 6.0 })
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::Combine(CombinePieces {
                first_id: 1,
                second_id: 4,
                x: 7.0,
                y: 8.0,
            })
        );
    }

    #[test]
    fn test_commands_after_exit_are_rejected() {
        let (handle, mut rx) = handle();
        handle.exit();
        handle.exit();

        assert!(handle.is_closed());
        assert!(matches!(
            handle.pick_up_piece(1, 0.0, 0.0),
            Err(SessionError::Closed)
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_commands_fail_when_writer_is_gone() {
        let (handle, rx) = handle();
        drop(rx);
        assert!(matches!(
            handle.move_piece(1, 0.0, 0.0),
            Err(SessionError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_closed_resolves_after_exit() {
        let (handle, _rx) = handle();
        let other = handle.clone();
        let waiter = tokio::spawn(async move { other.closed().await });
        handle.exit();
        waiter.await.unwrap();
    }
}
