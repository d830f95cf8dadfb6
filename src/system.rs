const RAM_SAFETY_FACTOR: f64 = 0.9;

/// Where a working set lands relative to the last-level cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingSetTier {
    FitsL3,
    ExceedsL3,
    Unknown,
}

impl WorkingSetTier {
    pub fn describe(self) -> &'static str {
        match self {
            WorkingSetTier::FitsL3 => "fits in L3 cache",
            WorkingSetTier::ExceedsL3 => "exceeds L3 cache, reads reach DRAM",
            WorkingSetTier::Unknown => "L3 cache size unknown",
        }
    }
}

pub fn classify_working_set(bytes: u64, l3_bytes: Option<usize>) -> WorkingSetTier {
    match l3_bytes {
        Some(l3) if bytes <= l3 as u64 => WorkingSetTier::FitsL3,
        Some(_) => WorkingSetTier::ExceedsL3,
        None => WorkingSetTier::Unknown,
    }
}

/// Logs how a buffer of `bytes` relates to the host's cache and RAM.
/// Never fails: a buffer larger than physical memory still gets attempted.
pub fn log_memory_context(bytes: u64) {
    let l3 = detect_l3_cache_bytes();
    let tier = classify_working_set(bytes, l3);

    match l3 {
        Some(l3) => log::info!(
            "[Host] L3 cache: {} → working set {}",
            crate::reporting::format_bytes(l3 as u64),
            tier.describe()
        ),
        None => log::info!("[Host] {}", tier.describe()),
    }

    check_ram_headroom(bytes, total_system_ram_bytes());
}

/// Returns `false` (and warns) when `bytes` exceeds the safe share of RAM.
pub fn check_ram_headroom(bytes: u64, total_ram: Option<u64>) -> bool {
    let Some(total) = total_ram else {
        log::debug!("[Host] total RAM unknown, skipping headroom check");
        return true;
    };

    let limit = (total as f64 * RAM_SAFETY_FACTOR) as u64;
    if bytes > limit {
        log::warn!(
            "[Host] buffer of {} exceeds {}% of system RAM ({} total)",
            crate::reporting::format_bytes(bytes),
            (RAM_SAFETY_FACTOR * 100.0) as usize,
            crate::reporting::format_bytes(total)
        );
        return false;
    }

    true
}

#[cfg(target_os = "linux")]
pub fn detect_l3_cache_bytes() -> Option<usize> {
    use std::fs;

    for index in 0..=10 {
        let base = format!("/sys/devices/system/cpu/cpu0/cache/index{}", index);

        if let Ok(level) = fs::read_to_string(format!("{}/level", base))
            && level.trim() == "3"
            && let Ok(size) = fs::read_to_string(format!("{}/size", base))
            && let Some(bytes) = parse_cache_size(&size)
        {
            return Some(bytes);
        }
    }

    None
}

#[cfg(target_os = "macos")]
pub fn detect_l3_cache_bytes() -> Option<usize> {
    // Intel Macs expose L3 directly, Apple Silicon per perflevel
    [
        "hw.l3cachesize",
        "hw.perflevel0.l3cachesize",
        "hw.perflevel1.l3cachesize",
    ]
    .into_iter()
    .filter_map(sysctl_u64)
    .find(|&bytes| bytes > 0)
    .map(|bytes| bytes as usize)
}

#[cfg(target_os = "windows")]
pub fn detect_l3_cache_bytes() -> Option<usize> {
    use windows_sys::Win32::System::SystemInformation::{
        GetLogicalProcessorInformationEx,
        RelationCache,
        SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX,
    };

    let mut len: u32 = 0;
    unsafe {
        GetLogicalProcessorInformationEx(RelationCache, std::ptr::null_mut(), &mut len);
    }
    if len == 0 {
        return None;
    }

    let mut buffer = vec![0u8; len as usize];
    let ok = unsafe {
        GetLogicalProcessorInformationEx(
            RelationCache,
            buffer.as_mut_ptr() as *mut SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX,
            &mut len,
        )
    };
    if ok == 0 {
        return None;
    }

    buffer.truncate(len as usize);
    l3_from_processor_records(&buffer)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn detect_l3_cache_bytes() -> Option<usize> {
    None
}

/// `LOGICAL_PROCESSOR_RELATIONSHIP::RelationCache`
const RELATION_CACHE: u32 = 2;

/// Walks packed `SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX` records and returns
/// the size of the first non-empty level-3 cache.
///
/// Record layout: relationship `u32`, record size `u32`, then a
/// `CACHE_RELATIONSHIP` (level `u8`, associativity `u8`, line size `u16`,
/// cache size `u32`, ...).
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn l3_from_processor_records(buffer: &[u8]) -> Option<usize> {
    let read_u32 = |at: usize| -> Option<u32> {
        let bytes = buffer.get(at..at + 4)?;
        Some(u32::from_ne_bytes(bytes.try_into().ok()?))
    };

    let mut offset = 0usize;
    while offset + 16 <= buffer.len() {
        let relationship = read_u32(offset)?;
        let size = read_u32(offset + 4)? as usize;
        if size == 0 {
            break;
        }

        if relationship == RELATION_CACHE && buffer[offset + 8] == 3 {
            let cache_size = read_u32(offset + 12)? as usize;
            if cache_size > 0 {
                return Some(cache_size);
            }
        }

        offset += size;
    }

    None
}

/// Parses sysfs cache sizes such as `8192K`, `12M` or a raw byte count.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_cache_size(s: &str) -> Option<usize> {
    let s = s.trim();

    if let Some(kb) = s.strip_suffix(['K', 'k']) {
        kb.parse::<usize>().ok()?.checked_mul(1024)
    } else if let Some(mb) = s.strip_suffix(['M', 'm']) {
        mb.parse::<usize>().ok()?.checked_mul(1024 * 1024)
    } else {
        s.parse().ok()
    }
}

pub fn total_system_ram_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let contents = std::fs::read_to_string("/proc/meminfo").ok()?;
        parse_meminfo_total(&contents)
    }

    #[cfg(target_os = "windows")]
    {
        use std::mem;

        use windows_sys::Win32::System::SystemInformation::{
            GlobalMemoryStatusEx,
            MEMORYSTATUSEX,
        };

        unsafe {
            let mut mem_info: MEMORYSTATUSEX = mem::zeroed();
            mem_info.dwLength = mem::size_of::<MEMORYSTATUSEX>() as u32;

            if GlobalMemoryStatusEx(&mut mem_info) != 0 {
                return Some(mem_info.ullTotalPhys);
            }
        }
        None
    }

    #[cfg(target_os = "macos")]
    {
        sysctl_u64("hw.memsize")
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        None
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_meminfo_total(contents: &str) -> Option<u64> {
    let line = contents.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    kb.checked_mul(1024)
}

#[cfg(target_os = "macos")]
fn sysctl_u64(name: &str) -> Option<u64> {
    use std::ffi::{CString, c_void};

    unsafe extern "C" {
        fn sysctlbyname(
            name: *const std::os::raw::c_char,
            oldp: *mut c_void,
            oldlenp: *mut usize,
            newp: *mut c_void,
            newlen: usize,
        ) -> std::os::raw::c_int;
    }

    let c_name = CString::new(name).ok()?;
    let mut value: u64 = 0;
    let mut size = std::mem::size_of::<u64>();

    let ret = unsafe {
        sysctlbyname(
            c_name.as_ptr(),
            &mut value as *mut _ as *mut c_void,
            &mut size,
            std::ptr::null_mut(),
            0,
        )
    };

    (ret == 0 && size == std::mem::size_of::<u64>()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cache_size() {
        assert_eq!(parse_cache_size("8192K"), Some(8 * 1024 * 1024));
        assert_eq!(parse_cache_size("512k\n"), Some(512 * 1024));
        assert_eq!(parse_cache_size("12M"), Some(12 * 1024 * 1024));
        assert_eq!(parse_cache_size("8388608"), Some(8_388_608));
        assert_eq!(parse_cache_size("lots"), None);
    }

    #[test]
    fn test_parse_meminfo_total() {
        let meminfo = "MemTotal:       16318412 kB\nMemFree:         1234 kB\n";
        assert_eq!(parse_meminfo_total(meminfo), Some(16_318_412 * 1024));
        assert_eq!(parse_meminfo_total("MemFree: 1 kB\n"), None);
    }

    fn cache_record(level: u8, cache_size: u32) -> Vec<u8> {
        let mut record = Vec::with_capacity(48);
        record.extend_from_slice(&RELATION_CACHE.to_ne_bytes());
        record.extend_from_slice(&48u32.to_ne_bytes());
        record.extend_from_slice(&[level, 8]);
        record.extend_from_slice(&64u16.to_ne_bytes());
        record.extend_from_slice(&cache_size.to_ne_bytes());
        record.resize(48, 0);
        record
    }

    #[test]
    fn test_l3_from_processor_records() {
        let mut buffer = cache_record(1, 48 * 1024);
        buffer.extend(cache_record(2, 2 * 1024 * 1024));
        buffer.extend(cache_record(3, 36 * 1024 * 1024));
        assert_eq!(l3_from_processor_records(&buffer), Some(36 * 1024 * 1024));
    }

    #[test]
    fn test_l3_from_processor_records_without_l3() {
        let mut buffer = cache_record(1, 32 * 1024);
        buffer.extend(cache_record(2, 1024 * 1024));
        assert_eq!(l3_from_processor_records(&buffer), None);
        assert_eq!(l3_from_processor_records(&[]), None);
        // zero-sized record must not loop forever
        assert_eq!(l3_from_processor_records(&[0u8; 16]), None);
    }

    #[test]
    fn test_classify_working_set() {
        let l3 = Some(32 * 1024 * 1024);
        assert_eq!(classify_working_set(4 * 1024 * 1024, l3), WorkingSetTier::FitsL3);
        assert_eq!(classify_working_set(40_000_000, l3), WorkingSetTier::ExceedsL3);
        assert_eq!(classify_working_set(4096, None), WorkingSetTier::Unknown);
    }

    #[test]
    fn test_ram_headroom() {
        let gib = 1024 * 1024 * 1024u64;
        assert!(check_ram_headroom(1024, Some(gib)));
        assert!(!check_ram_headroom(gib, Some(gib)));
        assert!(check_ram_headroom(u64::MAX, None));
    }

    #[test]
    fn test_cross_platform_detection_doesnt_panic() {
        let _ = detect_l3_cache_bytes();
        let _ = total_system_ram_bytes();
        log_memory_context(40_000_000);
    }
}
