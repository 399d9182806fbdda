//! Tag catalog: numeric identifiers and data-type codes for RPM headers.
//!
//! RPM headers are bags of typed tag entries. General-header tags start at
//! 1000; signature-header tags overlap that range on disk, so the public
//! API addresses them shifted by [`SIG_TAG_BASE`] into a disjoint
//! namespace. [`RpmHeader`](crate::RpmHeader) routes a shifted tag to the
//! signature header automatically.

/// Data type codes used in header index entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TagType {
    /// No data.
    Null = 0,
    /// Single bytes, printable.
    Char = 1,
    /// 8-bit integers.
    Int8 = 2,
    /// Big-endian 16-bit integers, 2-byte aligned.
    Int16 = 3,
    /// Big-endian 32-bit integers, 4-byte aligned.
    Int32 = 4,
    /// Big-endian 64-bit integers, 8-byte aligned.
    Int64 = 5,
    /// A single NUL-terminated string (count must be 1).
    String = 6,
    /// Opaque binary data.
    Bin = 7,
    /// An array of NUL-terminated strings.
    StringArray = 8,
    /// An array of NUL-terminated strings selected by locale.
    I18nString = 9,
}

impl TagType {
    /// Maps an on-disk data type code to a `TagType`.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Null,
            1 => Self::Char,
            2 => Self::Int8,
            3 => Self::Int16,
            4 => Self::Int32,
            5 => Self::Int64,
            6 => Self::String,
            7 => Self::Bin,
            8 => Self::StringArray,
            9 => Self::I18nString,
            _ => return None,
        })
    }

    /// Size in bytes of one element, for fixed-width types.
    ///
    /// String families are NUL-delimited and have no fixed width; for them
    /// this returns `None`.
    pub fn fixed_size(self) -> Option<usize> {
        Some(match self {
            Self::Null => 0,
            Self::Char | Self::Int8 | Self::Bin => 1,
            Self::Int16 => 2,
            Self::Int32 => 4,
            Self::Int64 => 8,
            Self::String | Self::StringArray | Self::I18nString => return None,
        })
    }

    /// Required data-area alignment for this type.
    pub fn alignment(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Int32 => 4,
            Self::Int64 => 8,
            _ => 1,
        }
    }

    /// Returns true for the NUL-terminated string families.
    pub fn is_string(self) -> bool {
        matches!(self, Self::String | Self::StringArray | Self::I18nString)
    }
}

/// First tag of the general-header range.
pub const GENERAL_TAG_BASE: i32 = 1000;

/// Offset added to signature-header tags so that they do not collide with
/// general-header tags in the public API.
pub const SIG_TAG_BASE: i32 = 16384;

// General header tags.

/// Package name.
pub const NAME: i32 = 1000;
/// Package version.
pub const VERSION: i32 = 1001;
/// Package release.
pub const RELEASE: i32 = 1002;
/// Package epoch; absent means "0".
pub const EPOCH: i32 = 1003;
/// One-line summary.
pub const SUMMARY: i32 = 1004;
/// Long description.
pub const DESCRIPTION: i32 = 1005;
/// Build timestamp (seconds since epoch).
pub const BUILDTIME: i32 = 1006;
/// Host the package was built on.
pub const BUILDHOST: i32 = 1007;
/// Sum of regular file sizes (u32; see [`LONGSIZE`]).
pub const SIZE: i32 = 1009;
/// Distribution name.
pub const DISTRIBUTION: i32 = 1010;
/// Vendor name.
pub const VENDOR: i32 = 1011;
/// GIF icon.
pub const GIF: i32 = 1012;
/// XPM icon.
pub const XPM: i32 = 1013;
/// License string.
pub const LICENSE: i32 = 1014;
/// Packager contact.
pub const PACKAGER: i32 = 1015;
/// Package group.
pub const GROUP: i32 = 1016;
/// Changelog entries (legacy combined form).
pub const CHANGELOG: i32 = 1017;
/// Source archive names.
pub const SOURCE: i32 = 1018;
/// Patch file names.
pub const PATCH: i32 = 1019;
/// Upstream URL.
pub const URL: i32 = 1020;
/// Target operating system.
pub const OS: i32 = 1021;
/// Target architecture.
pub const ARCH: i32 = 1022;
/// Pre-install scriptlet.
pub const PREIN: i32 = 1023;
/// Post-install scriptlet.
pub const POSTIN: i32 = 1024;
/// Pre-uninstall scriptlet.
pub const PREUN: i32 = 1025;
/// Post-uninstall scriptlet.
pub const POSTUN: i32 = 1026;
/// Legacy absolute file path list; modern packages store
/// [`DIRNAMES`]/[`BASENAMES`]/[`DIRINDEXES`] instead.
pub const OLDFILENAMES: i32 = 1027;
/// Per-file sizes (u32; see [`LONGFILESIZES`]).
pub const FILESIZES: i32 = 1028;
/// Per-file mode bits.
pub const FILEMODES: i32 = 1030;
/// Per-file rdev numbers.
pub const FILERDEVS: i32 = 1033;
/// Per-file modification times.
pub const FILEMTIMES: i32 = 1034;
/// Per-file content digests (hex), historically MD5.
pub const FILEDIGESTS: i32 = 1035;
/// Per-file symlink targets.
pub const FILELINKTOS: i32 = 1036;
/// Per-file flag bitmask; see the `RPMFILE_*` constants.
pub const FILEFLAGS: i32 = 1037;
/// Per-file owner user name.
pub const FILEUSERNAME: i32 = 1039;
/// Per-file owner group name.
pub const FILEGROUPNAME: i32 = 1040;
/// Package icon.
pub const ICON: i32 = 1043;
/// Source RPM file name.
pub const SOURCERPM: i32 = 1044;
/// Per-file verification bitmask; see the `RPMVERIFY_*` constants.
pub const FILEVERIFYFLAGS: i32 = 1045;
/// Uncompressed payload size (u32; see [`SIG_LONGARCHIVESIZE`]).
pub const ARCHIVESIZE: i32 = 1046;
/// Provide names.
pub const PROVIDENAME: i32 = 1047;
/// Require flags.
pub const REQUIREFLAGS: i32 = 1048;
/// Require names.
pub const REQUIRENAME: i32 = 1049;
/// Require versions.
pub const REQUIREVERSION: i32 = 1050;
/// Conflict flags.
pub const CONFLICTFLAGS: i32 = 1053;
/// Conflict names.
pub const CONFLICTNAME: i32 = 1054;
/// Conflict versions.
pub const CONFLICTVERSION: i32 = 1055;
/// Version of rpm that built the package.
pub const RPMVERSION: i32 = 1064;
/// Trigger scriptlet bodies.
pub const TRIGGERSCRIPTS: i32 = 1065;
/// Trigger target names.
pub const TRIGGERNAME: i32 = 1066;
/// Trigger target versions.
pub const TRIGGERVERSION: i32 = 1067;
/// Trigger flags; see the `RPMSENSE_*` constants.
pub const TRIGGERFLAGS: i32 = 1068;
/// Trigger script index per trigger.
pub const TRIGGERINDEX: i32 = 1069;
/// Verify scriptlet.
pub const VERIFYSCRIPT: i32 = 1079;
/// Changelog timestamps.
pub const CHANGELOGTIME: i32 = 1080;
/// Changelog author lines.
pub const CHANGELOGNAME: i32 = 1081;
/// Changelog entry bodies.
pub const CHANGELOGTEXT: i32 = 1082;
/// Interpreter for [`PREIN`].
pub const PREINPROG: i32 = 1085;
/// Interpreter for [`POSTIN`].
pub const POSTINPROG: i32 = 1086;
/// Interpreter for [`PREUN`].
pub const PREUNPROG: i32 = 1087;
/// Interpreter for [`POSTUN`].
pub const POSTUNPROG: i32 = 1088;
/// Obsolete names.
pub const OBSOLETENAME: i32 = 1090;
/// Interpreter for [`VERIFYSCRIPT`].
pub const VERIFYSCRIPTPROG: i32 = 1091;
/// Interpreters for [`TRIGGERSCRIPTS`].
pub const TRIGGERSCRIPTPROG: i32 = 1092;
/// Per-file device numbers.
pub const FILEDEVICES: i32 = 1095;
/// Per-file inode numbers.
pub const FILEINODES: i32 = 1096;
/// Provide flags.
pub const PROVIDEFLAGS: i32 = 1112;
/// Provide versions.
pub const PROVIDEVERSION: i32 = 1113;
/// Obsolete flags.
pub const OBSOLETEFLAGS: i32 = 1114;
/// Obsolete versions.
pub const OBSOLETEVERSION: i32 = 1115;
/// Per-file index into [`DIRNAMES`].
pub const DIRINDEXES: i32 = 1116;
/// Per-file base names.
pub const BASENAMES: i32 = 1117;
/// Directory name pool.
pub const DIRNAMES: i32 = 1118;
/// Payload archive format; "cpio" is the only supported value.
pub const PAYLOADFORMAT: i32 = 1124;
/// Payload compression: gzip, bzip2, xz, lzma, zstd.
pub const PAYLOADCOMPRESSOR: i32 = 1125;
/// Per-file color classification for multilib.
pub const FILECOLORS: i32 = 1140;

// Obsolete soft-dependency tags, kept for reading old packages.

/// Obsolete suggest names.
pub const OLDSUGGESTSNAME: i32 = 1156;
/// Obsolete suggest versions.
pub const OLDSUGGESTSVERSION: i32 = 1157;
/// Obsolete suggest flags.
pub const OLDSUGGESTSFLAGS: i32 = 1158;
/// Obsolete enhance names.
pub const OLDENHANCESNAME: i32 = 1159;
/// Obsolete enhance versions.
pub const OLDENHANCESVERSION: i32 = 1160;
/// Obsolete enhance flags.
pub const OLDENHANCESFLAGS: i32 = 1161;

// Patch-lineage tags from the SUSE fork of rpm.

/// Backward-link package id.
pub const BLINKPKGID: i32 = 1164;
/// Backward-link header id.
pub const BLINKHDRID: i32 = 1165;
/// Backward-link NEVRA.
pub const BLINKNEVRA: i32 = 1166;
/// Forward-link package id.
pub const FLINKPKGID: i32 = 1167;
/// Forward-link header id.
pub const FLINKHDRID: i32 = 1168;
/// Forward-link NEVRA.
pub const FLINKNEVRA: i32 = 1169;
/// Pre-install trigger scriptlets.
pub const TRIGGERPREIN: i32 = 1170;

/// Per-file sizes as u64, for packages with files over 4 GiB.
pub const LONGFILESIZES: i32 = 5008;
/// Sum of file sizes as u64.
pub const LONGSIZE: i32 = 5009;
/// Per-file capability strings.
pub const FILECAPS: i32 = 5010;
/// Algorithm code for [`FILEDIGESTS`]; see the `HASH_*` constants.
pub const FILEDIGESTALGO: i32 = 5011;
/// Bug reporting URL.
pub const BUGURL: i32 = 5012;
/// Version control locator the package was built from.
pub const VCS: i32 = 5034;
/// Recommend names.
pub const RECOMMENDNAME: i32 = 5046;
/// Recommend versions.
pub const RECOMMENDVERSION: i32 = 5047;
/// Recommend flags.
pub const RECOMMENDFLAGS: i32 = 5048;
/// Suggest names.
pub const SUGGESTNAME: i32 = 5049;
/// Suggest versions.
pub const SUGGESTVERSION: i32 = 5050;
/// Suggest flags.
pub const SUGGESTFLAGS: i32 = 5051;
/// Supplement names.
pub const SUPPLEMENTNAME: i32 = 5052;
/// Supplement versions.
pub const SUPPLEMENTVERSION: i32 = 5053;
/// Supplement flags.
pub const SUPPLEMENTFLAGS: i32 = 5054;
/// Enhance names.
pub const ENHANCENAME: i32 = 5055;
/// Enhance versions.
pub const ENHANCEVERSION: i32 = 5056;
/// Enhance flags.
pub const ENHANCEFLAGS: i32 = 5057;
/// Header string encoding marker.
pub const ENCODING: i32 = 5062;
/// Digest of the payload as stored (hex).
pub const PAYLOADDIGEST: i32 = 5092;
/// Algorithm code for [`PAYLOADDIGEST`]; see the `HASH_*` constants.
pub const PAYLOADDIGESTALGO: i32 = 5093;

// Signature header tags in the low (unshifted) range.

/// Base of the low signature tag range.
pub const SIG_BASE: i32 = 256;
/// DSA signature over the general header only.
pub const SIG_DSA: i32 = SIG_BASE + 11;
/// RSA signature over the general header only.
pub const SIG_RSA: i32 = SIG_BASE + 12;
/// SHA1 of the general header (hex).
pub const SIG_SHA1: i32 = SIG_BASE + 13;
/// Header plus compressed payload size as u64.
pub const SIG_LONGSIGSIZE: i32 = SIG_BASE + 14;
/// Uncompressed payload size as u64.
pub const SIG_LONGARCHIVESIZE: i32 = SIG_BASE + 15;
/// SHA256 of the general header (hex).
pub const SIG_SHA256: i32 = SIG_BASE + 17;

// Signature header tags addressed through the shifted namespace.

/// Header plus compressed payload size (u32).
pub const SIG_SIZE: i32 = SIG_TAG_BASE + 1000;
/// PGP signature over the general header plus payload.
pub const SIG_PGP: i32 = SIG_TAG_BASE + 1002;
/// MD5 of the general header plus payload (binary).
pub const SIG_MD5: i32 = SIG_TAG_BASE + 1004;
/// GPG signature over the general header plus payload (same role as
/// [`SIG_PGP`]).
pub const SIG_GPG: i32 = SIG_TAG_BASE + 1005;
/// Uncompressed payload size (u32).
pub const SIG_PAYLOADSIZE: i32 = SIG_TAG_BASE + 1007;
/// Zero padding that keeps the signature header footprint stable across
/// re-signings.
pub const SIG_RESERVEDSPACE: i32 = SIG_TAG_BASE + 1008;

// Header region tags.

/// Region tag of a signature header.
pub const RPMTAG_HEADERSIGNATURES: i32 = 62;
/// Region tag of a general (immutable) header.
pub const RPMTAG_HEADERIMMUTABLE: i32 = 63;
/// Region tag namespace end.
pub const RPMTAG_HEADERREGIONS: i32 = 64;

// FILEFLAGS bitmask elements.

/// Marks a `%config` file.
pub const RPMFILE_CONFIG: i32 = 1 << 0;
/// Marks a `%doc` file.
pub const RPMFILE_DOC: i32 = 1 << 1;
/// Marks an icon file.
pub const RPMFILE_ICON: i32 = 1 << 2;
/// File may be missing at verify time.
pub const RPMFILE_MISSINGOK: i32 = 1 << 3;
/// Config file that must not be replaced on upgrade.
pub const RPMFILE_NOREPLACE: i32 = 1 << 4;
/// The package's spec file.
pub const RPMFILE_SPECFILE: i32 = 1 << 5;
/// Ghost file: named by the package but not carried in the payload.
pub const RPMFILE_GHOST: i32 = 1 << 6;
/// Marks a `%license` file.
pub const RPMFILE_LICENSE: i32 = 1 << 7;
/// Marks a `%readme` file.
pub const RPMFILE_README: i32 = 1 << 8;
/// Excluded from the package.
pub const RPMFILE_EXCLUDE: i32 = 1 << 9;
/// Unpatched source.
pub const RPMFILE_UNPATCHED: i32 = 1 << 10;
/// Public key carried as a file.
pub const RPMFILE_PUBKEY: i32 = 1 << 11;
/// SELinux policy carried as a file.
pub const RPMFILE_POLICY: i32 = 1 << 12;

// FILEVERIFYFLAGS bitmask elements.

/// Verify the file digest.
pub const RPMVERIFY_FILEDIGEST: i32 = 1 << 0;
/// Verify the file size.
pub const RPMVERIFY_FILESIZE: i32 = 1 << 1;
/// Verify the symlink target.
pub const RPMVERIFY_LINKTO: i32 = 1 << 2;
/// Verify the owning user.
pub const RPMVERIFY_USER: i32 = 1 << 3;
/// Verify the owning group.
pub const RPMVERIFY_GROUP: i32 = 1 << 4;
/// Verify the modification time.
pub const RPMVERIFY_MTIME: i32 = 1 << 5;
/// Verify the mode bits.
pub const RPMVERIFY_MODE: i32 = 1 << 6;
/// Verify the device number.
pub const RPMVERIFY_RDEV: i32 = 1 << 7;
/// Verify file capabilities.
pub const RPMVERIFY_CAPS: i32 = 1 << 8;
/// Verify the security context.
pub const RPMVERIFY_CONTEXTS: i32 = 1 << 15;

// TRIGGERFLAGS bitmask elements; a subset of the rpmsense flags makes
// sense for triggers.

/// Version relation: less than.
pub const RPMSENSE_LESS: i32 = 1 << 1;
/// Version relation: greater than.
pub const RPMSENSE_GREATER: i32 = 1 << 2;
/// Version relation: equal.
pub const RPMSENSE_EQUAL: i32 = 1 << 3;
/// Post-transaction scriptlet dependency.
pub const RPMSENSE_POSTTRANS: i32 = 1 << 5;
/// Install-order prerequisite.
pub const RPMSENSE_PREREQ: i32 = 1 << 6;
/// Pre-transaction scriptlet dependency.
pub const RPMSENSE_PRETRANS: i32 = 1 << 7;
/// Scriptlet interpreter dependency.
pub const RPMSENSE_INTERP: i32 = 1 << 8;
/// Needed by the pre-install scriptlet.
pub const RPMSENSE_SCRIPT_PRE: i32 = 1 << 9;
/// Needed by the post-install scriptlet.
pub const RPMSENSE_SCRIPT_POST: i32 = 1 << 10;
/// Trigger on install.
pub const RPMSENSE_TRIGGERIN: i32 = 1 << 16;
/// Trigger on uninstall.
pub const RPMSENSE_TRIGGERUN: i32 = 1 << 17;
/// Trigger after uninstall.
pub const RPMSENSE_TRIGGERPOSTUN: i32 = 1 << 18;
/// Trigger before install.
pub const RPMSENSE_TRIGGERPREIN: i32 = 1 << 25;

// PGP/RPM digest algorithm codes (shared by FILEDIGESTALGO and
// PAYLOADDIGESTALGO).

/// MD5.
pub const HASH_MD5: i32 = 1;
/// SHA1.
pub const HASH_SHA1: i32 = 2;
/// SHA256.
pub const HASH_SHA256: i32 = 8;
/// SHA384.
pub const HASH_SHA384: i32 = 9;
/// SHA512.
pub const HASH_SHA512: i32 = 10;
/// SHA224.
pub const HASH_SHA224: i32 = 11;
