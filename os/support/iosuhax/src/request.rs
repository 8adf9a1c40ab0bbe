//! # Wire format
//!
//! Every request is an `IOCTL_SVC` carrying five words; the reply is a
//! single word.
//!
//! | Word | svc `0x81` (kernel backdoor) | svc `0x53` (run code) |
//! |------|------------------------------|-----------------------|
//! | 0    | `0x81`                       | `0x53`                |
//! | 1    | [`KernelCommand`]            | physical address      |
//! | 2..5 | arguments                    | zero                  |

/// The only ioctl used; the other `/dev/iosuhax` ioctls are not needed.
pub const IOCTL_SVC: u32 = 0x02;

/// Kernel backdoor syscall.
pub const SVC_KERNEL: u32 = 0x81;

/// Syscall that makes the IOSU kernel branch to a physical address.
pub const SVC_RUN_PHYSICAL: u32 = 0x53;

/// Number of words in a request.
pub const REQUEST_WORDS: usize = 5;

/// Sub-commands of [`SVC_KERNEL`].
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KernelCommand {
    Read32 = 1,
    Write32 = 2,
    Memcpy = 3,
    GetCfwConfig = 4,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SvcRequest([u32; REQUEST_WORDS]);

impl SvcRequest {
    #[must_use]
    pub const fn kernel(command: KernelCommand, a1: u32, a2: u32, a3: u32) -> Self {
        Self([SVC_KERNEL, command as u32, a1, a2, a3])
    }

    #[must_use]
    pub const fn run_physical(addr: u32) -> Self {
        Self([SVC_RUN_PHYSICAL, addr, 0, 0, 0])
    }

    #[must_use]
    pub const fn words(&self) -> &[u32; REQUEST_WORDS] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_request_layout() {
        let req = SvcRequest::kernel(KernelCommand::Write32, 0x1010_0000, 0xabcd, 0);
        assert_eq!(req.words(), &[0x81, 2, 0x1010_0000, 0xabcd, 0]);
    }

    #[test]
    fn run_request_layout() {
        assert_eq!(
            SvcRequest::run_physical(0x1010_0000).words(),
            &[0x53, 0x1010_0000, 0, 0, 0]
        );
    }
}
