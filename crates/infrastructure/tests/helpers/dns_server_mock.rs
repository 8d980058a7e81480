use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// NOERROR with one A record per address.
    Answer(Vec<Ipv4Addr>),
    /// Header only, with the given RCODE.
    Rcode(u8),
    /// Never answers.
    Silent,
    /// A reply with a foreign ID first, then the real answer.
    WrongIdFirst(Vec<Ipv4Addr>),
}

pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = queries.clone();

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let query = &buf[..len];
                        match &behavior {
                            MockBehavior::Silent => {}
                            MockBehavior::Answer(ips) => {
                                let _ = socket.send_to(&build_response(query, 0, ips), peer).await;
                            }
                            MockBehavior::Rcode(rcode) => {
                                let _ = socket.send_to(&build_response(query, *rcode, &[]), peer).await;
                            }
                            MockBehavior::WrongIdFirst(ips) => {
                                let mut foreign = build_response(query, 0, &[Ipv4Addr::new(6, 6, 6, 6)]);
                                foreign[0] ^= 0xFF;
                                let _ = socket.send_to(&foreign, peer).await;
                                let _ = socket.send_to(&build_response(query, 0, ips), peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

/// Echoes the question and appends A records pointing back at it.
pub fn build_response(query: &[u8], rcode: u8, ips: &[Ipv4Addr]) -> Vec<u8> {
    if query.len() < 12 {
        return vec![];
    }

    let mut response = Vec::with_capacity(512);
    response.extend_from_slice(&query[0..2]);
    response.push(0x81);
    response.push(0x80 | (rcode & 0x0F));
    response.extend_from_slice(&query[4..6]);
    response.extend_from_slice(&(ips.len() as u16).to_be_bytes());
    response.extend_from_slice(&[0x00, 0x00]);
    response.extend_from_slice(&[0x00, 0x00]);
    response.extend_from_slice(&query[12..]);

    for ip in ips {
        response.extend_from_slice(&[
            0xc0, 0x0c, // name pointer to the question
            0x00, 0x01, // A
            0x00, 0x01, // IN
            0x00, 0x00, 0x00, 0x3c, // TTL 60
            0x00, 0x04,
        ]);
        response.extend_from_slice(&ip.octets());
    }

    response
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
