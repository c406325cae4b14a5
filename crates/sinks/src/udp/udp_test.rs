use super::*;

use std::time::Duration;

const SENTENCE: &[u8] = b"!AIVDM,1,1,,A,15Muq70001G?tRrM5M4P8?v4080u,0*28\r\n";

async fn local_receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

#[tokio::test]
async fn test_emit_sends_one_datagram() {
    let (receiver, port) = local_receiver().await;

    let emitter = DatagramEmitter::new(DatagramConfig::new("127.0.0.1", port));
    assert!(emitter.start().await);
    assert!(emitter.emit(SENTENCE).await);

    let mut buf = [0u8; 128];
    let n = tokio::time::timeout(Duration::from_secs(2), receiver.recv(&mut buf))
        .await
        .expect("no datagram arrived")
        .unwrap();
    assert_eq!(&buf[..n], SENTENCE);
}

#[tokio::test]
async fn test_each_emit_is_its_own_datagram() {
    let (receiver, port) = local_receiver().await;

    let emitter = DatagramEmitter::new(DatagramConfig::new("127.0.0.1", port));
    assert!(emitter.start().await);
    assert!(emitter.emit(SENTENCE).await);
    assert!(emitter.emit(SENTENCE).await);

    let mut buf = [0u8; 256];
    for _ in 0..2 {
        let n = tokio::time::timeout(Duration::from_secs(2), receiver.recv(&mut buf))
            .await
            .expect("no datagram arrived")
            .unwrap();
        // One sentence per datagram, never two concatenated
        assert_eq!(n, SENTENCE.len());
    }
}

#[tokio::test]
async fn test_emit_before_start_returns_false() {
    let emitter = DatagramEmitter::new(DatagramConfig::new("127.0.0.1", 19));
    assert!(!emitter.emit(SENTENCE).await);
}

#[tokio::test]
async fn test_emit_after_stop_returns_false() {
    let (_receiver, port) = local_receiver().await;

    let emitter = DatagramEmitter::new(DatagramConfig::new("127.0.0.1", port));
    assert!(emitter.start().await);
    emitter.stop().await;
    assert!(!emitter.is_running());
    assert!(!emitter.emit(SENTENCE).await);
}

#[tokio::test]
async fn test_double_start_is_a_noop_returning_true() {
    let (_receiver, port) = local_receiver().await;

    let emitter = DatagramEmitter::new(DatagramConfig::new("127.0.0.1", port));
    assert!(emitter.start().await);
    assert!(emitter.start().await);
    assert!(emitter.is_running());
    emitter.stop().await;
}

#[tokio::test]
async fn test_unresolvable_target_fails_start() {
    let emitter = DatagramEmitter::new(DatagramConfig::new("not an address", 1));
    assert!(!emitter.start().await);
    assert!(!emitter.is_running());
}

#[test]
fn test_target_parses() {
    let emitter = DatagramEmitter::new(DatagramConfig::new("255.255.255.255", 10110));
    assert_eq!(
        emitter.target(),
        Some("255.255.255.255:10110".parse().unwrap())
    );
}
