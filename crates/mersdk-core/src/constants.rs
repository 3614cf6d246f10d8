//! Fixed names shared with the SDK installer and the build engine tooling.

/// Settings file location relative to a settings root
pub const MER_SDK_FILENAME: &str = "qtcreator/mersdk.xml";

/// Document type written into the settings XML
pub const MER_SDK_DOCTYPE: &str = "MerSDKs";

/// Device descriptor file name inside an SDK's shared config folder
pub const MER_DEVICES_FILENAME: &str = "devices.xml";

/// Directory holding the per-user SDK wrapper scripts
pub const MER_SDK_TOOLS: &str = "mer-sdk-tools";

/// Current settings schema version
pub const MER_SDK_FILE_VERSION: i64 = 1;

/// Schema version key
pub const MER_SDK_FILE_VERSION_KEY: &str = "FileVersion";
/// SDK install directory key
pub const MER_SDK_INSTALLDIR: &str = "InstallDir";
/// Number of stored SDK maps
pub const MER_SDK_COUNT_KEY: &str = "SdkCount";
/// Prefix of the indexed SDK map keys
pub const MER_SDK_DATA_KEY: &str = "Sdk";

/// Virtual machine name
pub const VIRTUAL_MACHINE: &str = "MerSDK.VirtualMachine";
/// Forwarded SSH port
pub const SSH_PORT: &str = "MerSDK.SshPort";
/// Forwarded web port
pub const WWW_PORT: &str = "MerSDK.WwwPort";
/// Host name
pub const HOST: &str = "MerSDK.Host";
/// User name
pub const USERNAME: &str = "MerSDK.UserName";
/// Private key file
pub const PRIVATE_KEY_FILE: &str = "MerSDK.PrivateKeyFile";
/// Shared home folder
pub const SHARED_HOME: &str = "MerSDK.SharedHome";
/// Shared targets folder
pub const SHARED_TARGET: &str = "MerSDK.SharedTarget";
/// Shared config folder
pub const SHARED_CONFIG: &str = "MerSDK.SharedConfig";
/// Shared source folder
pub const SHARED_SRC: &str = "MerSDK.SharedSrc";
/// Shared ssh folder
pub const SHARED_SSH: &str = "MerSDK.SharedSsh";
/// Installed target names
pub const TARGETS: &str = "MerSDK.Targets";
/// Headless start flag
pub const HEADLESS: &str = "MerSDK.Headless";

/// Host used to reach a freshly created build engine
pub const MER_SDK_DEFAULTHOST: &str = "localhost";

/// User name inside the build engine
pub const MER_SDK_DEFAULTUSER: &str = "mersdk";

/// Engine subnet written into every device descriptor. Fixed on customer request.
pub const MER_ENGINE_SUBNET: &str = "10.220.220";

/// Device descriptor type tag for hardware devices
pub const DEVICE_TYPE_REAL: &str = "real";

/// Device descriptor type tag for VirtualBox machines (engine and emulators)
pub const DEVICE_TYPE_VBOX: &str = "vbox";
