use iosuhax::request::IOCTL_SVC;
use iosuhax::{ChannelError, IOSUHAX_PATH, Ios, IosuhaxChannel};
use latte_mmio::PhysAddr;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// An iosuhax that keeps Starbuck memory in a map.
#[derive(Default)]
struct State {
    open_result: Option<i32>,
    fail_ioctl_at: Option<usize>,
    opened: Vec<String>,
    closed: Vec<i32>,
    requests: Vec<(i32, u32, Vec<u32>)>,
    memory: BTreeMap<u32, u32>,
}

#[derive(Clone, Default)]
struct FakeIos(Rc<RefCell<State>>);

impl Ios for FakeIos {
    type Fd = i32;

    fn open(&mut self, path: &str, _mode: u32) -> Result<i32, i32> {
        let mut s = self.0.borrow_mut();
        s.opened.push(path.to_owned());
        match s.open_result {
            Some(code) if code < 0 => Err(code),
            Some(fd) => Ok(fd),
            None => Ok(3),
        }
    }

    fn ioctl(&mut self, fd: i32, request: u32, input: &[u32], output: &mut [u32]) -> i32 {
        let mut s = self.0.borrow_mut();
        let n = s.requests.len();
        s.requests.push((fd, request, input.to_vec()));
        if s.fail_ioctl_at == Some(n) {
            return -4;
        }
        output[0] = match *input {
            [0x81, 1, addr, ..] => s.memory.get(&addr).copied().unwrap_or(0),
            [0x81, 2, addr, value, _] => {
                s.memory.insert(addr, value);
                0
            }
            [0x81, 4, ..] => 0x1,
            _ => 0,
        };
        0
    }

    fn close(&mut self, fd: i32) {
        self.0.borrow_mut().closed.push(fd);
    }
}

const PAYLOAD: PhysAddr = PhysAddr::new(0x1010_0000);

#[test]
fn missing_service_is_reported_as_unavailable() {
    let ios = FakeIos::default();
    ios.0.borrow_mut().open_result = Some(-6);

    let err = IosuhaxChannel::open(ios.clone()).err();
    assert_eq!(err, Some(ChannelError::Unavailable(-6)));
    assert!(err.unwrap().to_string().contains("Please start Mocha"));
    assert_eq!(ios.0.borrow().opened, [IOSUHAX_PATH]);
    assert!(ios.0.borrow().closed.is_empty());
}

#[test]
fn words_round_trip_through_the_kernel() {
    let ios = FakeIos::default();
    let mut ch = IosuhaxChannel::open(ios.clone()).unwrap();

    ch.write_word(PAYLOAD, 0xcafe_f00d).unwrap();
    assert_eq!(ch.read_word(PAYLOAD).unwrap(), 0xcafe_f00d);

    let s = ios.0.borrow();
    assert_eq!(
        s.requests,
        [
            (3, IOCTL_SVC, vec![0x81, 2, 0x1010_0000, 0xcafe_f00d, 0]),
            (3, IOCTL_SVC, vec![0x81, 1, 0x1010_0000, 0, 0]),
        ]
    );
}

#[test]
fn block_writes_pad_the_last_word() {
    let ios = FakeIos::default();
    let mut ch = IosuhaxChannel::open(ios.clone()).unwrap();

    ch.write_block(PAYLOAD, b"abcdefg").unwrap();

    let s = ios.0.borrow();
    assert_eq!(s.requests.len(), 2);
    assert_eq!(s.memory[&0x1010_0000], u32::from_ne_bytes(*b"abcd"));
    assert_eq!(s.memory[&0x1010_0004], u32::from_ne_bytes(*b"efg\0"));
}

#[test]
fn block_write_stops_at_the_first_failure() {
    let ios = FakeIos::default();
    ios.0.borrow_mut().fail_ioctl_at = Some(1);
    let mut ch = IosuhaxChannel::open(ios.clone()).unwrap();

    let err = ch.write_block(PAYLOAD, &[0xff; 16]).unwrap_err();
    assert_eq!(err, ChannelError::Ioctl(-4));
    assert_eq!(ios.0.borrow().requests.len(), 2);
}

#[test]
fn privileged_call_and_helpers_use_the_documented_requests() {
    let ios = FakeIos::default();
    let mut ch = IosuhaxChannel::open(ios.clone()).unwrap();

    ch.kernel_memcpy(PhysAddr::new(0x0800_0000), PAYLOAD, 0x100).unwrap();
    assert_eq!(ch.cfw_config().unwrap(), 0x1);
    ch.trigger_privileged_call(PAYLOAD).unwrap();

    let inputs: Vec<_> = ios.0.borrow().requests.iter().map(|r| r.2.clone()).collect();
    assert_eq!(
        inputs,
        [
            vec![0x81, 3, 0x0800_0000, 0x1010_0000, 0x100],
            vec![0x81, 4, 0, 0, 0],
            vec![0x53, 0x1010_0000, 0, 0, 0],
        ]
    );
}

#[test]
fn handle_is_closed_on_drop() {
    let ios = FakeIos::default();
    ios.0.borrow_mut().open_result = Some(9);
    drop(IosuhaxChannel::open(ios.clone()).unwrap());
    assert_eq!(ios.0.borrow().closed, [9]);
}
