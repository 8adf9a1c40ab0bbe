use crate::request::{IOCTL_SVC, KernelCommand, SvcRequest};
use latte_mmio::PhysAddr;

/// Path of the iosuhax resource manager.
pub const IOSUHAX_PATH: &str = "/dev/iosuhax";

/// The IOS IPC calls the channel needs.
pub trait Ios {
    type Fd: Copy;

    /// Open a resource manager; `Err` carries the negative IOS error code.
    ///
    /// # Errors
    /// The IOS error code.
    fn open(&mut self, path: &str, mode: u32) -> Result<Self::Fd, i32>;

    /// Issue an ioctl. Returns the (possibly negative) IOS result.
    fn ioctl(&mut self, fd: Self::Fd, request: u32, input: &[u32], output: &mut [u32]) -> i32;

    fn close(&mut self, fd: Self::Fd);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ChannelError {
    #[error("/dev/iosuhax: error {0}. Please start Mocha")]
    Unavailable(i32),
    #[error("iosuhax ioctl failed with {0}")]
    Ioctl(i32),
}

/// An open handle to `/dev/iosuhax`, closed on drop.
///
/// Gives word-granular read and write access to all of Starbuck's physical
/// memory, and lets the IOSU kernel branch into code placed there.
pub struct IosuhaxChannel<I: Ios> {
    ios: I,
    fd: I::Fd,
}

impl<I: Ios> IosuhaxChannel<I> {
    /// # Errors
    /// [`ChannelError::Unavailable`] if the iosuhax service is not running.
    pub fn open(mut ios: I) -> Result<Self, ChannelError> {
        match ios.open(IOSUHAX_PATH, 0) {
            Ok(fd) => Ok(Self { ios, fd }),
            Err(code) => {
                let err = ChannelError::Unavailable(code);
                log::warn!("{err}");
                Err(err)
            }
        }
    }

    fn svc(&mut self, request: &SvcRequest) -> Result<u32, ChannelError> {
        let mut reply = [0; 1];
        let ret = self.ios.ioctl(self.fd, IOCTL_SVC, request.words(), &mut reply);
        if ret < 0 {
            return Err(ChannelError::Ioctl(ret));
        }
        Ok(reply[0])
    }

    fn kernel(
        &mut self,
        command: KernelCommand,
        a1: u32,
        a2: u32,
        a3: u32,
    ) -> Result<u32, ChannelError> {
        self.svc(&SvcRequest::kernel(command, a1, a2, a3))
    }

    /// # Errors
    /// [`ChannelError::Ioctl`] if the request was not delivered.
    pub fn read_word(&mut self, addr: PhysAddr) -> Result<u32, ChannelError> {
        self.kernel(KernelCommand::Read32, addr.as_u32(), 0, 0)
    }

    /// Returns the kernel's reply.
    ///
    /// # Errors
    /// [`ChannelError::Ioctl`] if the request was not delivered.
    pub fn write_word(&mut self, addr: PhysAddr, value: u32) -> Result<u32, ChannelError> {
        self.kernel(KernelCommand::Write32, addr.as_u32(), value, 0)
    }

    /// Write `bytes` to `dst` one native-endian word at a time. A trailing
    /// partial word is padded with zeros.
    ///
    /// # Errors
    /// The first failed word write; earlier words have been written.
    pub fn write_block(&mut self, dst: PhysAddr, bytes: &[u8]) -> Result<(), ChannelError> {
        let mut addr = dst;
        for chunk in bytes.chunks(4) {
            let mut word = [0; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            self.write_word(addr, u32::from_ne_bytes(word))?;
            addr += 4;
        }
        Ok(())
    }

    /// Copy `len` bytes between physical addresses inside the IOSU kernel.
    ///
    /// # Errors
    /// [`ChannelError::Ioctl`] if the request was not delivered.
    pub fn kernel_memcpy(
        &mut self,
        dst: PhysAddr,
        src: PhysAddr,
        len: u32,
    ) -> Result<u32, ChannelError> {
        self.kernel(KernelCommand::Memcpy, dst.as_u32(), src.as_u32(), len)
    }

    /// # Errors
    /// [`ChannelError::Ioctl`] if the request was not delivered.
    pub fn cfw_config(&mut self) -> Result<u32, ChannelError> {
        self.kernel(KernelCommand::GetCfwConfig, 0, 0, 0)
    }

    /// Have the IOSU kernel branch to `addr` on Starbuck.
    ///
    /// The reply carries no meaning; if the code at `addr` does not return,
    /// neither does this call.
    ///
    /// # Errors
    /// [`ChannelError::Ioctl`] if the request was not delivered.
    pub fn trigger_privileged_call(&mut self, addr: PhysAddr) -> Result<(), ChannelError> {
        log::info!("running code at {addr} on Starbuck");
        self.svc(&SvcRequest::run_physical(addr.as_u32())).map(|_| ())
    }
}

impl<I: Ios> Drop for IosuhaxChannel<I> {
    fn drop(&mut self) {
        self.ios.close(self.fd);
    }
}
