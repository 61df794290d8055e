use std::path::Path;

use dxfview_engine::session::{LoadStatus, ViewerSession};
use dxfview_io::{DocumentLoader, DxfFacade};
use tracing::debug;

/// 面板与状态栏中展示的文档名：取文件名，取不到时退回完整路径。
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 读取并解析磁盘上的 DXF 文件，结果交给会话。读取失败与解析失败走同一条路径。
pub fn load_file<L: DocumentLoader>(
    session: &mut ViewerSession,
    loader: &L,
    path: &Path,
) -> LoadStatus {
    let ticket = session.begin_load(display_name(path));
    debug!(ticket = ticket.id(), path = %path.display(), "读取 DXF 文件");
    let outcome = loader.load(path);
    session.finish_load(ticket, outcome).clone()
}

/// 解析已在内存中的字节（例如拖放得到的文件内容）。
pub fn load_bytes(session: &mut ViewerSession, name: &str, bytes: &[u8]) -> LoadStatus {
    let ticket = session.begin_load(name);
    let outcome = DxfFacade::new().parse_bytes(bytes);
    session.finish_load(ticket, outcome).clone()
}
