//! Socket construction helpers shared by every listener in the fabric.

use std::io;
use std::net::{SocketAddr, TcpListener};

use socket2::{Domain, Socket, Type};

/// Binds a `TcpListener` on `0.0.0.0:port` with `SO_REUSEADDR` set before
/// bind, as the original does via `setsockopt`. Backlog matches the
/// original's `listen(fd, 10)`.
pub fn bind_reuseaddr(port: u16) -> io::Result<TcpListener> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(10)?;
    socket.set_nonblocking(false)?;
    Ok(socket.into())
}

/// `bind_reuseaddr`, but treats `EADDRINUSE` as success with no listener —
/// the park-listener's documented tolerance for a pre-claimed port-forward
/// mapping (SPEC_FULL.md §4.B).
pub fn bind_tolerating_in_use(port: u16) -> io::Result<Option<TcpListener>> {
    match bind_reuseaddr(port) {
        Ok(listener) => Ok(Some(listener)),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => Ok(None),
        Err(e) => Err(e),
    }
}
