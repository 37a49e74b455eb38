//! Boot time, login sessions and best-effort host identification.

use chrono::Utc;
use tracing::debug;

use crate::collector::binary::layouts::{FREEBSD_AMD64_TIMEVAL, UTMP_USER_PROCESS};
use crate::collector::binary::{DecodeError, FromRecord, Timeval, Utmp, decode, decode_each};
use crate::collector::config::CollectorConfig;
use crate::collector::error::CollectError;
use crate::collector::platform::Platform;
use crate::collector::procfs::parser::{parse_btime, parse_os_release, parse_uptime};
use crate::collector::source::{read_binary, read_sysctl, read_text, run_command};
use crate::collector::traits::{CommandRunner, FileSystem, KernelSource};
use crate::model::{HostInfoStat, UserStat};

const CTL_KERN: i32 = 1;
const KERN_BOOTTIME: i32 = 21;

/// Distribution families, matched against `ID` and then each `ID_LIKE` entry.
const PLATFORM_FAMILIES: &[(&str, &str)] = &[
    ("debian", "debian"),
    ("ubuntu", "debian"),
    ("linuxmint", "debian"),
    ("raspbian", "debian"),
    ("rhel", "rhel"),
    ("centos", "rhel"),
    ("fedora", "rhel"),
    ("rocky", "rhel"),
    ("almalinux", "rhel"),
    ("amzn", "rhel"),
    ("ol", "rhel"),
    ("suse", "suse"),
    ("opensuse", "suse"),
    ("sles", "suse"),
    ("arch", "arch"),
    ("manjaro", "arch"),
    ("alpine", "alpine"),
    ("gentoo", "gentoo"),
];

/// Markers in `/proc/1/cgroup` naming the container runtime.
/// containerd shims report as `docker`.
const CGROUP_MARKERS: &[(&str, &str)] = &[
    ("kubepods", "kubernetes"),
    ("docker", "docker"),
    ("containerd", "docker"),
    ("lxc", "lxc"),
];

/// Kernel modules that mean this machine hosts guests.
const HOST_MODULES: &[(&str, &str)] = &[("kvm", "kvm"), ("vboxdrv", "vbox")];

/// Accumulates `HostInfoStat` fields from independent sub-queries.
///
/// Each setter takes an `Option`; `None` leaves the field at its default.
#[derive(Debug, Default)]
pub struct HostInfoBuilder {
    info: HostInfoStat,
}

impl HostInfoBuilder {
    pub fn new(os: &str) -> Self {
        Self {
            info: HostInfoStat {
                os: os.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn hostname(mut self, hostname: Option<String>) -> Self {
        if let Some(h) = hostname {
            self.info.hostname = h;
        }
        self
    }

    pub fn platform(mut self, platform: Option<PlatformInfo>) -> Self {
        if let Some(p) = platform {
            self.info.platform = p.name;
            self.info.platform_family = p.family;
            self.info.platform_version = p.version;
        }
        self
    }

    pub fn boot_time(mut self, boot_time: Option<u64>) -> Self {
        if let Some(b) = boot_time {
            self.info.boot_time = b;
        }
        self
    }

    pub fn uptime(mut self, uptime: Option<u64>) -> Self {
        if let Some(u) = uptime {
            self.info.uptime = u;
        }
        self
    }

    pub fn virtualization(mut self, virt: Option<Virtualization>) -> Self {
        if let Some(v) = virt {
            self.info.virtualization_system = v.system;
            self.info.virtualization_role = v.role;
        }
        self
    }

    pub fn build(self) -> HostInfoStat {
        self.info
    }
}

/// Platform name, family and version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    pub name: String,
    pub family: String,
    pub version: String,
}

/// Virtualization technology and whether we are its `guest` or `host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Virtualization {
    pub system: String,
    pub role: String,
}

impl Virtualization {
    fn guest(system: &str) -> Self {
        Self {
            system: system.to_string(),
            role: "guest".to_string(),
        }
    }

    fn host(system: &str) -> Self {
        Self {
            system: system.to_string(),
            role: "host".to_string(),
        }
    }
}

/// Logs a failed sub-query and turns it into `None`.
fn best_effort<T>(what: &str, result: Result<T, CollectError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(query = what, error = %e, "host sub-query failed");
            None
        }
    }
}

/// Collects host identification and login sessions.
pub struct HostCollector<F: FileSystem, K: KernelSource, C: CommandRunner> {
    fs: F,
    kernel: K,
    runner: C,
    config: CollectorConfig,
}

impl<F: FileSystem, K: KernelSource, C: CommandRunner> HostCollector<F, K, C> {
    pub fn new(fs: F, kernel: K, runner: C, config: CollectorConfig) -> Self {
        Self {
            fs,
            kernel,
            runner,
            config,
        }
    }

    /// Boot time in seconds since the epoch.
    pub fn boot_time(&self) -> Result<u64, CollectError> {
        match self.config.platform {
            Platform::FreeBsd => {
                let buf = read_sysctl(&self.kernel, "kern.boottime", &[CTL_KERN, KERN_BOOTTIME])?;
                let tv = Timeval::from_record(&decode(&buf, &FREEBSD_AMD64_TIMEVAL)?)?;
                u64::try_from(tv.sec).map_err(|_| {
                    CollectError::Decode(DecodeError::InvalidEncoding {
                        field: "sec",
                        reason: format!("negative boot time {}", tv.sec),
                    })
                })
            }
            Platform::Linux => {
                let content = read_text(&self.fs, &self.config.proc("stat"))?;
                Ok(parse_btime(&content)?)
            }
        }
    }

    /// Seconds since boot.
    pub fn uptime(&self) -> Result<u64, CollectError> {
        match self.config.platform {
            Platform::FreeBsd => {
                let boot = self.boot_time()?;
                let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
                Ok(now.saturating_sub(boot))
            }
            Platform::Linux => {
                let content = read_text(&self.fs, &self.config.proc("uptime"))?;
                Ok(parse_uptime(&content)?)
            }
        }
    }

    /// Sessions from the `utmp` file.
    ///
    /// Empty slots (zero start time) are skipped, and on layouts with a record
    /// type only user processes are kept.
    pub fn users(&self) -> Result<Vec<UserStat>, CollectError> {
        let buf = read_binary(&self.fs, &self.config.utmp_path)?;
        let records: Vec<Utmp> = decode_each(&buf, self.config.platform.utmp_layout())?;

        Ok(records
            .into_iter()
            .filter(|u| u.time != 0)
            .filter(|u| u.record_type.is_none_or(|t| t == UTMP_USER_PROCESS))
            .map(|u| UserStat {
                user: u.user,
                terminal: u.line,
                host: u.host,
                started: u.time,
            })
            .collect())
    }

    /// Host identification. Never fails: each field is filled independently.
    pub fn info(&self) -> HostInfoStat {
        let platform = self.config.platform;
        HostInfoBuilder::new(platform.os_name())
            .hostname(best_effort("hostname", self.hostname()))
            .platform(best_effort("platform", self.platform_info()))
            .boot_time(best_effort("boot_time", self.boot_time()))
            .uptime(best_effort("uptime", self.uptime()))
            .virtualization(self.virtualization())
            .build()
    }

    fn hostname(&self) -> Result<String, CollectError> {
        match run_command(&self.runner, "uname", &["-n"]) {
            Ok(out) => Ok(out.trim().to_string()),
            Err(e) if self.config.platform == Platform::Linux => {
                debug!(error = %e, "uname -n failed, reading kernel hostname");
                let content = read_text(&self.fs, &self.config.proc("sys/kernel/hostname"))?;
                Ok(content.trim().to_string())
            }
            Err(e) => Err(e),
        }
    }

    fn platform_info(&self) -> Result<PlatformInfo, CollectError> {
        if self.config.platform == Platform::Linux {
            match read_text(&self.fs, &self.config.root("etc/os-release")) {
                Ok(content) => {
                    let release = parse_os_release(&content);
                    if !release.id.is_empty() {
                        return Ok(PlatformInfo {
                            family: platform_family(&release.id, &release.id_like),
                            name: release.id,
                            version: release.version_id,
                        });
                    }
                }
                Err(e) => debug!(error = %e, "os-release unavailable, falling back to uname"),
            }
        }

        let name = run_command(&self.runner, "uname", &["-s"])?
            .trim()
            .to_lowercase();
        let version = best_effort("uname -r", run_command(&self.runner, "uname", &["-r"]))
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default();
        let family = match self.config.platform {
            Platform::FreeBsd => "freebsd".to_string(),
            Platform::Linux => String::new(),
        };
        Ok(PlatformInfo {
            name,
            family,
            version,
        })
    }

    fn virtualization(&self) -> Option<Virtualization> {
        match self.config.platform {
            Platform::Linux => self.linux_virtualization(),
            Platform::FreeBsd => self.freebsd_virtualization(),
        }
    }

    fn linux_virtualization(&self) -> Option<Virtualization> {
        if self.fs.exists(&self.config.root(".dockerenv")) {
            return Some(Virtualization::guest("docker"));
        }
        if self.fs.exists(&self.config.root("run/.containerenv")) {
            return Some(Virtualization::guest("podman"));
        }

        if let Ok(cgroup) = read_text(&self.fs, &self.config.proc("1/cgroup")) {
            for (marker, system) in CGROUP_MARKERS {
                if cgroup.contains(marker) {
                    return Some(Virtualization::guest(system));
                }
            }
        }

        if self.fs.exists(&self.config.proc("xen")) {
            let dom0 = read_text(&self.fs, &self.config.proc("xen/capabilities"))
                .map(|caps| caps.contains("control_d"))
                .unwrap_or(false);
            return Some(if dom0 {
                Virtualization::host("xen")
            } else {
                Virtualization::guest("xen")
            });
        }

        if let Ok(cpuinfo) = read_text(&self.fs, &self.config.proc("cpuinfo")) {
            if cpuinfo.contains("QEMU Virtual CPU") {
                return Some(Virtualization::guest("kvm"));
            }
            let hypervisor = cpuinfo
                .lines()
                .filter(|l| l.starts_with("flags"))
                .any(|l| l.split_whitespace().any(|f| f == "hypervisor"));
            if hypervisor {
                return Some(Virtualization::guest(""));
            }
        }

        if let Ok(modules) = read_text(&self.fs, &self.config.proc("modules")) {
            let loaded: Vec<&str> = modules
                .lines()
                .filter_map(|l| l.split_whitespace().next())
                .collect();
            if loaded.contains(&"vboxguest") {
                return Some(Virtualization::guest("vbox"));
            }
            for (module, system) in HOST_MODULES {
                if loaded.contains(module) {
                    return Some(Virtualization::host(system));
                }
            }
        }

        None
    }

    fn freebsd_virtualization(&self) -> Option<Virtualization> {
        let jailed = best_effort(
            "security.jail.jailed",
            run_command(&self.runner, "sysctl", &["-n", "security.jail.jailed"]),
        );
        if jailed.as_deref().map(str::trim) == Some("1") {
            return Some(Virtualization::guest("jail"));
        }

        let guest = best_effort(
            "kern.vm_guest",
            run_command(&self.runner, "sysctl", &["-n", "kern.vm_guest"]),
        )?;
        match guest.trim() {
            "none" | "" => None,
            system => Some(Virtualization::guest(system)),
        }
    }
}

/// Maps os-release `ID`/`ID_LIKE` to a distribution family.
fn platform_family(id: &str, id_like: &str) -> String {
    std::iter::once(id)
        .chain(id_like.split_whitespace())
        .find_map(|candidate| {
            PLATFORM_FAMILIES
                .iter()
                .find(|(name, _)| *name == candidate)
                .map(|(_, family)| family.to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::records::{bsd_utmp, glibc_utmp, timeval};
    use crate::collector::mock::{MockCommandRunner, MockFs, MockKernel};
    use std::io;

    type Mocked = HostCollector<MockFs, MockKernel, MockCommandRunner>;

    fn linux(fs: MockFs, runner: MockCommandRunner) -> Mocked {
        HostCollector::new(
            fs,
            MockKernel::new(),
            runner,
            CollectorConfig::default().with_platform(Platform::Linux),
        )
    }

    fn freebsd(fs: MockFs, kernel: MockKernel, runner: MockCommandRunner) -> Mocked {
        HostCollector::new(
            fs,
            kernel,
            runner,
            CollectorConfig::default().with_platform(Platform::FreeBsd),
        )
    }

    fn typical_freebsd() -> Mocked {
        freebsd(
            MockFs::typical_freebsd(),
            MockKernel::typical_freebsd(),
            MockCommandRunner::typical_freebsd(),
        )
    }

    #[test]
    fn test_linux_boot_time_and_uptime() {
        let c = linux(MockFs::typical_linux(), MockCommandRunner::new());
        assert_eq!(c.boot_time().unwrap(), 1_700_000_000);
        assert_eq!(c.uptime().unwrap(), 12345);
    }

    #[test]
    fn test_freebsd_boot_time() {
        assert_eq!(typical_freebsd().boot_time().unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_freebsd_boot_time_truncated() {
        let mut kernel = MockKernel::new();
        kernel.set_sysctl(&[1, 21], vec![0u8; 8]);
        let c = freebsd(MockFs::new(), kernel, MockCommandRunner::new());
        assert!(matches!(c.boot_time().unwrap_err(), CollectError::Decode(_)));
    }

    #[test]
    fn test_freebsd_uptime_from_boot_time() {
        let now = Utc::now().timestamp();
        let mut kernel = MockKernel::new();
        kernel.set_sysctl(&[1, 21], timeval(now - 3600, 0));
        let c = freebsd(MockFs::new(), kernel, MockCommandRunner::new());
        let uptime = c.uptime().unwrap();
        assert!((3600..3700).contains(&uptime));
    }

    #[test]
    fn test_linux_users_keep_user_processes() {
        let users = linux(MockFs::typical_linux(), MockCommandRunner::new())
            .users()
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(
            users[0],
            UserStat {
                user: "alice".into(),
                terminal: "pts/0".into(),
                host: String::new(),
                started: 1_700_000_100,
            }
        );
        assert_eq!(users[1].user, "bob");
        assert_eq!(users[1].host, "10.0.0.5");
    }

    #[test]
    fn test_freebsd_users_skip_empty_slots() {
        let users = typical_freebsd().users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user, "alice");
        assert_eq!(users[0].terminal, "ttyv0");
        assert_eq!(users[1].host, "192.168.1.20");
    }

    #[test]
    fn test_users_zero_time_record() {
        let mut fs = MockFs::new();
        fs.add_binary("/var/run/utmp", bsd_utmp("ghost", "ttyv1", "", 0));
        let c = freebsd(fs, MockKernel::new(), MockCommandRunner::new());
        assert!(c.users().unwrap().is_empty());
    }

    #[test]
    fn test_users_glibc_type_filter() {
        let mut fs = MockFs::new();
        let mut buf = glibc_utmp(2, "reboot", "~", "6.1.0", 1_700_000_000);
        buf.extend(glibc_utmp(8, "", "pts/3", "", 1_700_000_050));
        buf.extend(glibc_utmp(7, "dave", "pts/4", "", 1_700_000_060));
        fs.add_binary("/var/run/utmp", buf);
        let users = linux(fs, MockCommandRunner::new()).users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user, "dave");
    }

    #[test]
    fn test_users_empty_file() {
        let mut fs = MockFs::new();
        fs.add_binary("/var/run/utmp", Vec::new());
        let c = linux(fs, MockCommandRunner::new());
        assert!(c.users().unwrap().is_empty());
    }

    #[test]
    fn test_users_permission_denied() {
        let mut fs = MockFs::new();
        fs.fail("/var/run/utmp", io::ErrorKind::PermissionDenied);
        let c = linux(fs, MockCommandRunner::new());
        assert!(matches!(c.users().unwrap_err(), CollectError::PermissionDenied(_)));
    }

    #[test]
    fn test_linux_info() {
        let info = linux(MockFs::typical_linux(), MockCommandRunner::typical_linux()).info();
        assert_eq!(info.os, "linux");
        assert_eq!(info.hostname, "testhost");
        assert_eq!(info.platform, "ubuntu");
        assert_eq!(info.platform_family, "debian");
        assert_eq!(info.platform_version, "22.04");
        assert_eq!(info.boot_time, 1_700_000_000);
        assert_eq!(info.uptime, 12345);
        assert_eq!(info.virtualization_system, "");
        assert_eq!(info.virtualization_role, "");
    }

    #[test]
    fn test_info_hostname_falls_back_to_proc() {
        let info = linux(MockFs::typical_linux(), MockCommandRunner::new()).info();
        assert_eq!(info.hostname, "fallback-host");
        assert_eq!(info.platform, "ubuntu");
    }

    #[test]
    fn test_info_without_os_release_uses_uname() {
        let mut fs = MockFs::typical_linux();
        fs.remove("/etc/os-release");
        let info = linux(fs, MockCommandRunner::typical_linux()).info();
        assert_eq!(info.platform, "linux");
        assert_eq!(info.platform_family, "");
        assert_eq!(info.platform_version, "6.1.0-18-amd64");
    }

    #[test]
    fn test_info_every_subquery_failing_is_partial() {
        let info = linux(MockFs::new(), MockCommandRunner::new()).info();
        assert_eq!(
            info,
            HostInfoStat {
                os: "linux".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_info_one_failure_does_not_hide_others() {
        let mut fs = MockFs::typical_linux();
        fs.remove("/proc/stat");
        let info = linux(fs, MockCommandRunner::typical_linux()).info();
        assert_eq!(info.boot_time, 0);
        assert_eq!(info.uptime, 12345);
        assert_eq!(info.hostname, "testhost");
    }

    #[test]
    fn test_freebsd_info() {
        let info = typical_freebsd().info();
        assert_eq!(info.os, "freebsd");
        assert_eq!(info.hostname, "bsdhost");
        assert_eq!(info.platform, "freebsd");
        assert_eq!(info.platform_family, "freebsd");
        assert_eq!(info.platform_version, "14.1-release");
        assert_eq!(info.boot_time, 1_700_000_000);
        assert!(info.uptime > 0);
        assert_eq!(info.virtualization_system, "");
    }

    #[test]
    fn test_freebsd_jail() {
        let mut runner = MockCommandRunner::typical_freebsd();
        runner.add_output("sysctl", &["-n", "security.jail.jailed"], "1\n");
        let c = freebsd(MockFs::new(), MockKernel::typical_freebsd(), runner);
        let info = c.info();
        assert_eq!(info.virtualization_system, "jail");
        assert_eq!(info.virtualization_role, "guest");
    }

    #[test]
    fn test_freebsd_vm_guest() {
        let mut runner = MockCommandRunner::typical_freebsd();
        runner.add_output("sysctl", &["-n", "kern.vm_guest"], "kvm\n");
        let c = freebsd(MockFs::new(), MockKernel::typical_freebsd(), runner);
        assert_eq!(c.info().virtualization_system, "kvm");
    }

    fn linux_virt(setup: impl FnOnce(&mut MockFs)) -> Option<Virtualization> {
        let mut fs = MockFs::typical_linux();
        setup(&mut fs);
        linux(fs, MockCommandRunner::new()).linux_virtualization()
    }

    #[test]
    fn test_virtualization_detection() {
        assert_eq!(linux_virt(|_| {}), None);
        assert_eq!(
            linux_virt(|fs| fs.add_file("/.dockerenv", "")),
            Some(Virtualization::guest("docker"))
        );
        assert_eq!(
            linux_virt(|fs| fs.add_file("/run/.containerenv", "")),
            Some(Virtualization::guest("podman"))
        );
        assert_eq!(
            linux_virt(|fs| fs.add_file("/proc/1/cgroup", "0::/kubepods/besteffort/pod1\n")),
            Some(Virtualization::guest("kubernetes"))
        );
        assert_eq!(
            linux_virt(|fs| fs.add_file(
                "/proc/1/cgroup",
                "0::/system.slice/containerd.service/abc\n"
            )),
            Some(Virtualization::guest("docker"))
        );
        assert_eq!(
            linux_virt(|fs| fs.add_file("/proc/1/cgroup", "12:pids:/lxc/web\n")),
            Some(Virtualization::guest("lxc"))
        );
        assert_eq!(
            linux_virt(|fs| fs.add_dir("/proc/xen")),
            Some(Virtualization::guest("xen"))
        );
        assert_eq!(
            linux_virt(|fs| fs.add_file("/proc/xen/capabilities", "control_d\n")),
            Some(Virtualization::host("xen"))
        );
        assert_eq!(
            linux_virt(|fs| fs.add_file("/proc/modules", "kvm_intel 1 0\nkvm 2 1 kvm_intel\n")),
            Some(Virtualization::host("kvm"))
        );
        assert_eq!(
            linux_virt(|fs| fs.add_file("/proc/modules", "vboxguest 1 0\n")),
            Some(Virtualization::guest("vbox"))
        );
    }

    #[test]
    fn test_hypervisor_flag_sets_guest_role() {
        let virt = linux_virt(|fs| {
            fs.add_file(
                "/proc/cpuinfo",
                "processor\t: 0\nflags\t\t: fpu vme hypervisor sse\n",
            )
        })
        .unwrap();
        assert_eq!(virt.role, "guest");
        assert_eq!(virt.system, "");
    }

    #[test]
    fn test_platform_family() {
        assert_eq!(platform_family("ubuntu", "debian"), "debian");
        assert_eq!(platform_family("rocky", "rhel centos fedora"), "rhel");
        assert_eq!(platform_family("pop", "ubuntu debian"), "debian");
        assert_eq!(platform_family("opensuse-leap", "suse opensuse"), "suse");
        assert_eq!(platform_family("nixos", ""), "");
    }
}
