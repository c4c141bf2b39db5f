const HOST_NAME_BUFFER: usize = 256;

/// Picks the `hostName` stamped on every record: the configured override,
/// else the OS host name, else the listen address.
pub(super) fn resolve_host_name(configured: Option<&str>, listen: &str) -> String {
    configured
        .map(str::to_owned)
        .or_else(os_host_name)
        .unwrap_or_else(|| listen.to_owned())
}

fn os_host_name() -> Option<String> {
    let mut buffer = [0u8; HOST_NAME_BUFFER];
    // Safety: the pointer and length describe a live, writable buffer.
    let rc = unsafe { libc::gethostname(buffer.as_mut_ptr().cast(), buffer.len()) };
    if rc != 0 {
        return None;
    }
    let len = buffer.iter().position(|byte| *byte == 0).unwrap_or(buffer.len());
    let name = String::from_utf8_lossy(buffer.get(..len)?).trim().to_owned();
    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::resolve_host_name;
    use crate::error::{AppError, AppResult};

    #[test]
    fn configured_host_name_wins() -> AppResult<()> {
        let name = resolve_host_name(Some("edge-7"), "0.0.0.0:9001");
        if name != "edge-7" {
            return Err(AppError::distributed(format!("Unexpected host name: {}", name)));
        }
        Ok(())
    }

    #[test]
    fn os_host_name_is_never_empty() -> AppResult<()> {
        let name = resolve_host_name(None, "0.0.0.0:9001");
        if name.is_empty() || name.contains(' ') {
            return Err(AppError::distributed(format!("Unexpected host name: {:?}", name)));
        }
        Ok(())
    }
}
