//! 测试数据集模块
//!
//! 构建带有发布标签的临时 Git 仓库，模拟 Python 包的版本演进

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// 带标签的测试仓库
pub struct TestRepo {
    pub temp_dir: TempDir,
}

impl TestRepo {
    /// 初始化空仓库并配置提交者
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let repo = Self { temp_dir };

        repo.git(&["init"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "tag.gpgsign", "false"]);

        repo
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// 在仓库中执行 git 命令
    pub fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// 写入文件
    pub fn write(&self, name: &str, content: &str) -> &Self {
        let file_path = self.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        self
    }

    /// 删除文件
    pub fn remove(&self, name: &str) -> &Self {
        std::fs::remove_file(self.path().join(name)).expect("Failed to remove file");
        self
    }

    /// 提交当前工作区并打上附注标签
    pub fn release(&self, tag: &str) -> &Self {
        self.git(&["add", "-A"]);
        self.git(&["commit", "--allow-empty", "-m", &format!("Release {tag}")]);
        self.git(&["tag", "-a", tag, "-m", &format!("Version {tag}")]);
        self
    }
}

/// joblib 风格的包：1.0 版本
pub const INIT_V1: &str = r#""""Joblib is a set of tools to provide lightweight pipelining."""

from .memory import Memory, MemorizedResult
from .parallel import Parallel, delayed, cpu_count
from ._utils import _internal_helper

__version__ = "1.0"

__all__ = ["Memory", "MemorizedResult", "Parallel", "delayed", "cpu_count"]
"#;

/// joblib 风格的包：2.0 版本
pub const INIT_V2: &str = r#""""Joblib is a set of tools to provide lightweight pipelining."""

from .memory import Memory, MemorizedResult, register_store_backend
from .parallel import Parallel, delayed, cpu_count, effective_n_jobs

__version__ = "2.0"

__all__ = [
    "Memory",
    "MemorizedResult",
    "Parallel",
    "cpu_count",
    "delayed",
    "effective_n_jobs",
    "register_store_backend",
]
"#;

pub const MEMORY_V1: &str = r#"import os


class MemorizedResult:
    def get(self):
        pass


class Memory:
    location: str

    def __init__(self, location=None, verbose=1):
        self.location = location

    def cache(self, func=None, ignore=None):
        pass

    def clear(self, warn=True):
        pass

    def _private(self):
        pass


def _helper(x):
    return x
"#;

pub const MEMORY_V2: &str = r#"import os


class MemorizedResult:
    def get(self):
        pass


class Memory:
    location: str
    backend: str

    def __init__(self, location=None, backend="local", verbose=1):
        self.location = location

    def cache(self, func=None, ignore=None, verbose=None):
        pass

    def clear(self, warn=True) -> None:
        pass

    async def reduce_size(self, bytes_limit=None):
        pass


def register_store_backend(backend_name, backend):
    pass
"#;

pub const PARALLEL_V1: &str = r#"def cpu_count(only_physical_cores=False):
    pass


def delayed(function):
    pass


class Parallel(object):
    def __init__(self, n_jobs=None, backend=None):
        pass

    def __call__(self, iterable):
        pass
"#;

pub const PARALLEL_V2: &str = r#"def cpu_count(only_physical_cores=False):
    pass


def delayed(function):
    pass


def effective_n_jobs(n_jobs=-1):
    pass


class Parallel(object):
    def __init__(self, n_jobs=None, backend=None):
        pass

    def __call__(self, iterable):
        pass
"#;

pub const HASHING_V1: &str = r#"def hash(obj, hash_name="md5", coerce_mmap=False):
    pass
"#;

/// 创建包含 1.0 与 2.0 两个发布版本的仓库
///
/// 2.0 删除了 `joblib/hashing.py`，新增了 `joblib/compressor.py`，
/// 并修改了 `memory`、`parallel` 与包入口。
pub fn create_joblib_like_repo() -> TestRepo {
    let repo = TestRepo::new();

    repo.write("joblib/__init__.py", INIT_V1)
        .write("joblib/memory.py", MEMORY_V1)
        .write("joblib/parallel.py", PARALLEL_V1)
        .write("joblib/hashing.py", HASHING_V1)
        .write("joblib/_utils.py", "def _internal_helper():\n    pass\n")
        .write("joblib/tests/test_memory.py", "def test_cache():\n    pass\n")
        .write("setup.py", "from setuptools import setup\nsetup()\n")
        .release("1.0");

    repo.write("joblib/__init__.py", INIT_V2)
        .write("joblib/memory.py", MEMORY_V2)
        .write("joblib/parallel.py", PARALLEL_V2)
        .remove("joblib/hashing.py")
        .write(
            "joblib/compressor.py",
            "class CompressorWrapper:\n    prefix = b\"\"\n\n    def compressor_file(self, fileobj, compresslevel=None):\n        pass\n",
        )
        .write("joblib/tests/test_memory.py", "def test_cache(tmp_path):\n    pass\n")
        .write("joblib/_utils.py", "def _internal_helper(x):\n    pass\n")
        .release("2.0");

    repo
}
