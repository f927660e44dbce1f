//! File descriptor limit detection for capping the hash worker count (Unix).

/// Descriptors one hash worker may hold at once (the open file plus headroom for mmap).
pub const FDS_PER_WORKER: usize = 2;

/// Fraction of the process FD limit the workers may use together.
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Soft limit for open file descriptors, or `None` when unlimited or unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Largest worker count that stays under ~80% of `limit` descriptors (at least 1).
pub fn workers_for_fd_limit(limit: u64) -> usize {
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    (usable / FDS_PER_WORKER).max(1)
}

/// Cap `requested` by the process FD limit. Returns `requested` unchanged when no limit applies.
pub fn cap_workers_by_fd_limit(requested: usize) -> usize {
    match max_open_fds().map(workers_for_fd_limit) {
        Some(cap) if cap < requested => {
            log::debug!("Capping workers {} -> {} (FD limit ~80%)", requested, cap);
            cap
        }
        _ => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_limit_still_allows_one_worker() {
        assert_eq!(workers_for_fd_limit(0), 1);
        assert_eq!(workers_for_fd_limit(1), 1);
    }

    #[test]
    fn typical_limit() {
        // 1024 * 0.8 = 819 usable, 2 per worker
        assert_eq!(workers_for_fd_limit(1024), 409);
    }

    #[test]
    fn small_requests_pass_through() {
        assert_eq!(cap_workers_by_fd_limit(1), 1);
    }
}
