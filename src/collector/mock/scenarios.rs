//! Pre-built host scenarios.

use super::records::{DevstatBuilder, StatfsBuilder, bsd_utmp, devstat_dump, glibc_utmp, timeval};
use super::{MockCommandRunner, MockFs, MockKernel};
use crate::collector::binary::Bintime;
use crate::collector::binary::flags::{MNT_ACLS, MNT_MULTILABEL, MNT_NOSUID, MNT_SOFTDEP};

const MNT_LOCAL: u64 = 0x0000_1000;

const MEMINFO: &str = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       4096000 kB
SwapFree:        3072000 kB
Dirty:              1024 kB
";

const NETSTAT_IBDN: &str = "\
Name    Mtu Network       Address              Ipkts Ierrs Idrop     Ibytes    Opkts Oerrs     Obytes  Coll  Drop
em0    1500 <Link#1>      08:00:27:aa:bb:cc    12345     0     0    9876543     6789     0     543210     0     0
em0       - 10.0.2.0/24   10.0.2.15            11000     -     -    9000000     6000     -     500000     -     -
lo0   16384 <Link#2>                             100     0     0       5000      100     0       5000     0     0
lo0       - 127.0.0.0/8   127.0.0.1              100     -     -       5000      100     -       5000     -     -
";

impl MockFs {
    /// A Debian-family Linux host on bare metal with two logged-in users.
    pub fn typical_linux() -> Self {
        let mut fs = MockFs::new();

        fs.add_file("/proc/meminfo", MEMINFO);
        fs.add_file(
            "/proc/vmstat",
            "nr_free_pages 2048000\npswpin 100\npswpout 200\npgfault 123456\n",
        );
        fs.add_file(
            "/proc/stat",
            "cpu  10000 500 3000 80000 200 0 100 0 0 0\nctxt 987654\nbtime 1700000000\nprocesses 4321\n",
        );
        fs.add_file("/proc/uptime", "12345.67 98765.43\n");

        fs.add_file(
            "/proc/diskstats",
            "   8       0 sda 12345 100 987654 5000 6789 200 456789 3000 0 4000 8000 0 0 0 0\n\
             \x20  8       1 sda1 12000 90 980000 4900 6700 190 450000 2900 0 3900 7800 0 0 0 0\n\
             \x20259       0 nvme0n1 50000 0 4000000 1000 20000 0 1600000 800 0 1500 1800 0 0 0 0\n",
        );

        fs.add_file(
            "/proc/self/mounts",
            "/dev/sda1 / ext4 rw,relatime 0 0\n\
             proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0\n\
             /dev/sda2 /home ext4 rw,nosuid,relatime 0 0\n\
             tmpfs /run tmpfs rw,nosuid,nodev,size=1638400k 0 0\n",
        );

        fs.add_file(
            "/proc/net/dev",
            "Inter-|   Receive                                                |  Transmit\n \
             face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n  \
             eth0: 987654321 654321 1 2 0 0 0 0 123456789 123456 3 4 0 0 0 0\n    \
             lo: 1234567 1234 0 0 0 0 0 0 1234567 1234 0 0 0 0 0 0\n",
        );

        fs.add_file(
            "/etc/os-release",
            "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nID=ubuntu\nID_LIKE=debian\nPRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\n",
        );
        fs.add_file("/proc/sys/kernel/hostname", "fallback-host\n");
        fs.add_file("/proc/1/cgroup", "0::/init.scope\n");
        fs.add_file(
            "/proc/cpuinfo",
            "processor\t: 0\nmodel name\t: Intel(R) Xeon(R) CPU\nflags\t\t: fpu vme de pse tsc msr sse sse2\n",
        );
        fs.add_file("/proc/modules", "ext4 1 2 - Live 0x0\nxt_conntrack 1 0 - Live 0x0\n");

        let mut utmp = glibc_utmp(2, "reboot", "~", "6.1.0-18-amd64", 1_699_999_990);
        utmp.extend(glibc_utmp(7, "alice", "pts/0", "", 1_700_000_100));
        utmp.extend(glibc_utmp(8, "", "pts/1", "", 1_700_000_150));
        utmp.extend(glibc_utmp(7, "bob", "pts/2", "10.0.0.5", 1_700_000_200));
        utmp.extend(glibc_utmp(7, "stale", "pts/5", "", 0));
        fs.add_binary("/var/run/utmp", utmp);

        fs
    }

    /// A FreeBSD host with linprocfs mounted on `/proc`.
    pub fn typical_freebsd() -> Self {
        let mut fs = MockFs::new();

        fs.add_file("/proc/meminfo", MEMINFO);

        let mut utmp = bsd_utmp("alice", "ttyv0", "", 1_700_000_100);
        utmp.extend(bsd_utmp("", "", "", 0));
        utmp.extend(bsd_utmp("bob", "pts/0", "192.168.1.20", 1_700_000_300));
        fs.add_binary("/var/run/utmp", utmp);

        fs
    }
}

impl MockKernel {
    /// Two UFS filesystems plus devfs, one disk and one optical drive.
    pub fn typical_freebsd() -> Self {
        let mut kernel = MockKernel::new();

        let mut mounts = StatfsBuilder::new("/dev/ada0p2", "/", "ufs")
            .flags(MNT_LOCAL | MNT_SOFTDEP | MNT_ACLS)
            .blocks(4096, 1000, 400, 350)
            .files(500, 100)
            .build();
        mounts.extend(
            StatfsBuilder::new("/dev/ada0p3", "/home", "ufs")
                .flags(MNT_LOCAL | MNT_NOSUID | MNT_MULTILABEL)
                .blocks(4096, 20000, 15000, 14000)
                .files(10000, 9000)
                .build(),
        );
        mounts.extend(StatfsBuilder::new("devfs", "/dev", "devfs").blocks(512, 2, 2, 0).build());
        kernel.set_mount_table(mounts);

        kernel.set_sysctl(
            &[1, 773, 772],
            devstat_dump(&[
                DevstatBuilder::new("ada", 0)
                    .bytes(61_440_000, 32_768_000)
                    .operations(1500, 800)
                    .durations(Bintime::new(12, 1 << 62), Bintime::new(8, 1 << 63)),
                DevstatBuilder::new("cd", 0),
            ]),
        );

        kernel.set_sysctl(&[1, 21], timeval(1_700_000_000, 500_000));

        kernel
    }
}

impl MockCommandRunner {
    pub fn typical_linux() -> Self {
        let mut runner = MockCommandRunner::new();
        runner.add_output("uname", &["-n"], "testhost\n");
        runner.add_output("uname", &["-s"], "Linux\n");
        runner.add_output("uname", &["-r"], "6.1.0-18-amd64\n");
        runner
    }

    pub fn typical_freebsd() -> Self {
        let mut runner = MockCommandRunner::new();
        runner.add_output("uname", &["-n"], "bsdhost\n");
        runner.add_output("uname", &["-s"], "FreeBSD\n");
        runner.add_output("uname", &["-r"], "14.1-RELEASE\n");
        runner.add_output("/usr/bin/netstat", &["-ibdn"], NETSTAT_IBDN);
        runner.add_output("sysctl", &["-n", "security.jail.jailed"], "0\n");
        runner.add_output("sysctl", &["-n", "kern.vm_guest"], "none\n");
        runner
    }
}
