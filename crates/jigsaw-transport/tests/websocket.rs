//! Integration tests for the WebSocket client connection.
//!
//! These tests spin up a real WebSocket server on a local port and dial
//! it with [`WebSocketConnection`], so frames actually cross the network.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use jigsaw_transport::{Connection, Frame, WebSocketConnection};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::handshake::server::{
        ErrorResponse, Request, Response,
    };

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on a random port and returns it with its `ws://` URL.
    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have local addr");
        (listener, format!("ws://{addr}"))
    }

    /// Accepts one client, reporting the `User-Agent` it sent.
    async fn accept(
        listener: TcpListener,
        agent_tx: oneshot::Sender<String>,
    ) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        let callback =
            move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let agent = req
                    .headers()
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let _ = agent_tx.send(agent);
                Ok(resp)
            };
        tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_connect_sends_user_agent() {
        let (listener, url) = listen().await;
        let (agent_tx, agent_rx) = oneshot::channel();
        let server = tokio::spawn(accept(listener, agent_tx));

        let conn = WebSocketConnection::connect(&url, "JigsawTest/1.0")
            .await
            .expect("client should connect");
        let _server_ws = server.await.expect("task should complete");

        assert_eq!(agent_rx.await.unwrap(), "JigsawTest/1.0");
        assert!(conn.id().into_inner() > 0);
    }

    #[tokio::test]
    async fn test_text_and_binary_frames_keep_their_kind() {
        let (listener, url) = listen().await;
        let (agent_tx, _agent_rx) = oneshot::channel();
        let server = tokio::spawn(accept(listener, agent_tx));

        let conn = WebSocketConnection::connect(&url, "JigsawTest/1.0")
            .await
            .expect("client should connect");
        let mut server_ws = server.await.unwrap();

        // --- Server sends, client receives ---
        server_ws
            .send(Message::Text(r#"{"type":"me","id":3}"#.into()))
            .await
            .unwrap();
        server_ws
            .send(Message::Binary(vec![15, 3, 0].into()))
            .await
            .unwrap();

        let first = conn.recv().await.expect("recv").expect("frame");
        assert_eq!(first, Frame::Text(r#"{"type":"me","id":3}"#.into()));
        let second = conn.recv().await.expect("recv").expect("frame");
        assert_eq!(second, Frame::Binary(vec![15, 3, 0]));

        // --- Client sends, server receives ---
        conn.send(Frame::Binary(vec![11, 3, 0])).await.expect("send");
        conn.send(Frame::Text("hello".into())).await.expect("send");

        let msg = server_ws.next().await.unwrap().unwrap();
        assert!(matches!(msg, Message::Binary(_)));
        assert_eq!(msg.into_data().as_ref(), &[11, 3, 0]);
        let msg = server_ws.next().await.unwrap().unwrap();
        assert_eq!(msg, Message::Text("hello".into()));
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_server_close() {
        let (listener, url) = listen().await;
        let (agent_tx, _agent_rx) = oneshot::channel();
        let server = tokio::spawn(accept(listener, agent_tx));

        let conn = WebSocketConnection::connect(&url, "JigsawTest/1.0")
            .await
            .expect("client should connect");
        let mut server_ws = server.await.unwrap();

        server_ws.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let (listener, url) = listen().await;
        drop(listener);

        let result = WebSocketConnection::connect(&url, "JigsawTest/1.0").await;
        assert!(result.is_err());
    }
}
