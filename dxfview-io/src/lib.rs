use std::fs;
use std::path::Path;

use dxfview_core::{
    document::{
        Arc, Circle, DEFAULT_LAYER, Document, DocumentHeader, Entity, Line, OtherEntity, Polyline,
    },
    geometry::Point3,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

/// DXF 读取入口。只识别 HEADER 与 ENTITIES 段，其余段整体跳过。
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }

    /// 从内存中的字节缓冲解析文档。非 UTF-8 字节按替换字符处理。
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Document, IoError> {
        let data = String::from_utf8_lossy(bytes);
        if data.trim().is_empty() {
            return Err(IoError::InvalidDocument("DXF 内容为空".to_string()));
        }
        let document = DxfParser::new(&data)
            .parse()
            .map_err(|DxfError { message }| IoError::InvalidDocument(message))?;
        debug!(
            entities = document.entity_count(),
            version = document.header().version.as_deref().unwrap_or("-"),
            "DXF 解析完成"
        );
        Ok(document)
    }
}

impl Default for DxfFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for DxfFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let data = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_bytes(&data)
    }
}

#[derive(Debug)]
struct DxfError {
    message: String,
}

impl DxfError {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

struct DxfParser<'a> {
    reader: DxfReader<'a>,
}

impl<'a> DxfParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: DxfReader::new(source),
        }
    }

    fn parse(mut self) -> Result<Document, DxfError> {
        let mut document = Document::new();
        while let Some((code, value)) = self.reader.next_pair()? {
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "意外的组码 {code}（期望 0 表示 SECTION/EOF）"
                )));
            }
            match value.trim() {
                "SECTION" => {
                    let (name_code, name) = self
                        .reader
                        .next_pair()?
                        .ok_or_else(|| DxfError::invalid("SECTION 缺少名称（组码 2）"))?;
                    if name_code != 2 {
                        return Err(DxfError::invalid(format!(
                            "SECTION 名称使用了组码 {name_code}（期望 2）"
                        )));
                    }
                    match name.trim() {
                        "HEADER" => self.parse_header(document.header_mut())?,
                        "ENTITIES" => self.parse_entities(&mut document)?,
                        _ => self.skip_section()?,
                    }
                }
                "EOF" => break,
                unexpected => {
                    return Err(DxfError::invalid(format!(
                        "意外的标记 {unexpected}，期望 SECTION 或 EOF"
                    )));
                }
            }
        }
        Ok(document)
    }

    fn skip_section(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value.trim() == "ENDSEC" => break,
                Some(_) => continue,
                None => {
                    return Err(DxfError::invalid("SECTION 未找到 ENDSEC 终止标记"));
                }
            }
        }
        Ok(())
    }

    fn parse_header(&mut self, header: &mut DocumentHeader) -> Result<(), DxfError> {
        let mut variable: Option<String> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value.trim() == "ENDSEC" => break,
                Some((9, name)) => variable = Some(name.trim().to_string()),
                Some((code, value)) => match (variable.as_deref(), code) {
                    (Some("$ACADVER"), 1) => header.version = non_empty(&value),
                    (Some("$TDCREATE"), 40) => header.created_at = non_empty(&value),
                    _ => {}
                },
                None => return Err(DxfError::invalid("HEADER 段未找到 ENDSEC 终止标记")),
            }
        }
        Ok(())
    }

    fn parse_entities(&mut self, document: &mut Document) -> Result<(), DxfError> {
        loop {
            let (code, value) = match self.reader.next_pair()? {
                Some(pair) => pair,
                None => return Err(DxfError::invalid("ENTITIES 段提前结束")),
            };
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "ENTITIES 段遇到组码 {code}（期望 0 表示实体起始）"
                )));
            }

            match value.trim() {
                "ENDSEC" => break,
                "SEQEND" => self.skip_entity_body()?,
                kind => {
                    let parsed = self.parse_entity(kind)?;
                    document.add_entity(parsed);
                }
            }
        }
        Ok(())
    }

    fn parse_entity(&mut self, kind: &str) -> Result<Entity, DxfError> {
        match kind {
            "LINE" => self.parse_line(),
            "CIRCLE" => self.parse_circle(),
            "ARC" => self.parse_arc(),
            "LWPOLYLINE" => self.parse_lwpolyline(),
            "POLYLINE" => self.parse_polyline(),
            other => self.parse_other(other),
        }
    }

    fn parse_line(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut start = CoordSlots::default();
        let mut end = CoordSlots::default();
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10 => assign_coord(&mut start.x, &value, "LINE 起点 X（组码 10）")?,
                    20 => assign_coord(&mut start.y, &value, "LINE 起点 Y（组码 20）")?,
                    30 => assign_coord(&mut start.z, &value, "LINE 起点 Z（组码 30）")?,
                    11 => assign_coord(&mut end.x, &value, "LINE 终点 X（组码 11）")?,
                    21 => assign_coord(&mut end.y, &value, "LINE 终点 Y（组码 21）")?,
                    31 => assign_coord(&mut end.z, &value, "LINE 终点 Z（组码 31）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("LINE 未正确结束")),
            }
        }

        Ok(Entity::Line(Line {
            start: start.finish("LINE 起点（组码 10/20）")?,
            end: end.finish("LINE 终点（组码 11/21）")?,
            layer: layer.unwrap_or_else(|| DEFAULT_LAYER.to_string()),
        }))
    }

    fn parse_circle(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center = CoordSlots::default();
        let mut radius = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10 => assign_coord(&mut center.x, &value, "CIRCLE 圆心 X（组码 10）")?,
                    20 => assign_coord(&mut center.y, &value, "CIRCLE 圆心 Y（组码 20）")?,
                    30 => assign_coord(&mut center.z, &value, "CIRCLE 圆心 Z（组码 30）")?,
                    40 => assign_coord(&mut radius, &value, "CIRCLE 半径（组码 40）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("CIRCLE 未正确结束")),
            }
        }

        let radius = radius.ok_or_else(|| DxfError::invalid("CIRCLE 缺少半径（组码 40）"))?;
        Ok(Entity::Circle(Circle {
            center: center.finish("CIRCLE 圆心（组码 10/20）")?,
            radius,
            layer: layer.unwrap_or_else(|| DEFAULT_LAYER.to_string()),
        }))
    }

    fn parse_arc(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center = CoordSlots::default();
        let mut radius = None;
        let mut start_angle = None;
        let mut end_angle = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10 => assign_coord(&mut center.x, &value, "ARC 圆心 X（组码 10）")?,
                    20 => assign_coord(&mut center.y, &value, "ARC 圆心 Y（组码 20）")?,
                    30 => assign_coord(&mut center.z, &value, "ARC 圆心 Z（组码 30）")?,
                    40 => assign_coord(&mut radius, &value, "ARC 半径（组码 40）")?,
                    // 角度保持为度，转换放在几何构建阶段
                    50 => assign_coord(&mut start_angle, &value, "ARC 起始角（组码 50）")?,
                    51 => assign_coord(&mut end_angle, &value, "ARC 终止角（组码 51）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("ARC 未正确结束")),
            }
        }

        let radius = radius.ok_or_else(|| DxfError::invalid("ARC 缺少半径（组码 40）"))?;
        let start_angle =
            start_angle.ok_or_else(|| DxfError::invalid("ARC 缺少起始角（组码 50）"))?;
        let end_angle = end_angle.ok_or_else(|| DxfError::invalid("ARC 缺少终止角（组码 51）"))?;
        Ok(Entity::Arc(Arc {
            center: center.finish("ARC 圆心（组码 10/20）")?,
            radius,
            start_angle,
            end_angle,
            layer: layer.unwrap_or_else(|| DEFAULT_LAYER.to_string()),
        }))
    }

    fn parse_lwpolyline(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut is_closed = false;
        let mut elevation = 0.0;
        let mut planar: Vec<(f64, f64)> = Vec::new();
        let mut pending_x: Option<f64> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    70 => {
                        let flag = parse_i32(&value, "LWPOLYLINE 标志（组码 70）")?;
                        is_closed = flag & 0x01 == 0x01;
                    }
                    38 => elevation = parse_f64(&value, "LWPOLYLINE 标高（组码 38）")?,
                    10 => {
                        let x = parse_f64(&value, "LWPOLYLINE 顶点 X（组码 10）")?;
                        if pending_x.replace(x).is_some() {
                            return Err(DxfError::invalid(
                                "LWPOLYLINE 顶点缺少对应的 Y（组码 20）",
                            ));
                        }
                    }
                    20 => {
                        let y = parse_f64(&value, "LWPOLYLINE 顶点 Y（组码 20）")?;
                        let x = pending_x.take().ok_or_else(|| {
                            DxfError::invalid("LWPOLYLINE 顶点 Y（组码 20）出现前缺少组码 10")
                        })?;
                        planar.push((x, y));
                    }
                    _ => {}
                },
                None => return Err(DxfError::invalid("LWPOLYLINE 未正确结束")),
            }
        }

        if pending_x.is_some() {
            return Err(DxfError::invalid(
                "LWPOLYLINE 顶点坐标成对出现（组码 10/20），检测到不完整的顶点",
            ));
        }

        let vertices = planar
            .into_iter()
            .map(|(x, y)| Point3::new(x, y, elevation))
            .collect();
        Ok(Entity::LwPolyline(Polyline {
            vertices,
            is_closed,
            layer: layer.unwrap_or_else(|| DEFAULT_LAYER.to_string()),
        }))
    }

    /// 旧式 POLYLINE：头部之后跟随若干 VERTEX，直到 SEQEND。
    fn parse_polyline(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut flags = 0;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    70 => flags = parse_i32(&value, "POLYLINE 标志（组码 70）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("POLYLINE 未正确结束")),
            }
        }

        let mut vertices = Vec::new();
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => match value.trim() {
                    "VERTEX" => {
                        if let Some(vertex) = self.parse_vertex()? {
                            vertices.push(vertex);
                        }
                    }
                    "SEQEND" => {
                        self.skip_entity_body()?;
                        break;
                    }
                    _ => {
                        // 缺少 SEQEND 时由下一个实体结束序列
                        self.reader.put_back((0, value));
                        break;
                    }
                },
                Some((code, _)) => {
                    return Err(DxfError::invalid(format!(
                        "POLYLINE 顶点序列遇到组码 {code}（期望 0）"
                    )));
                }
                None => return Err(DxfError::invalid("POLYLINE 缺少 SEQEND")),
            }
        }

        Ok(Entity::Polyline(Polyline {
            vertices,
            is_closed: flags & 0x01 == 0x01,
            layer: layer.unwrap_or_else(|| DEFAULT_LAYER.to_string()),
        }))
    }

    /// 读取一个 VERTEX。多面网格的面记录（仅置 0x80 位）不含坐标，返回 `None`。
    fn parse_vertex(&mut self) -> Result<Option<Point3>, DxfError> {
        let mut position = CoordSlots::default();
        let mut flags = 0;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    10 => assign_coord(&mut position.x, &value, "VERTEX X（组码 10）")?,
                    20 => assign_coord(&mut position.y, &value, "VERTEX Y（组码 20）")?,
                    30 => assign_coord(&mut position.z, &value, "VERTEX Z（组码 30）")?,
                    70 => flags = parse_i32(&value, "VERTEX 标志（组码 70）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("VERTEX 未正确结束")),
            }
        }

        if flags & 0x80 != 0 && flags & 0x40 == 0 {
            return Ok(None);
        }
        position.finish("VERTEX 坐标（组码 10/20）").map(Some)
    }

    fn parse_other(&mut self, kind: &str) -> Result<Entity, DxfError> {
        let mut layer = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((8, value)) => layer = Some(value.trim().to_string()),
                Some(_) => continue,
                None => break,
            }
        }
        Ok(Entity::Other(OtherEntity {
            kind: kind.to_string(),
            layer: layer.unwrap_or_else(|| DEFAULT_LAYER.to_string()),
        }))
    }

    fn skip_entity_body(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }
}

/// 逐个收集 X/Y/Z 组码，Z 缺省为 0。
#[derive(Default)]
struct CoordSlots {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

impl CoordSlots {
    fn finish(self, context: &str) -> Result<Point3, DxfError> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Ok(Point3::new(x, y, self.z.unwrap_or(0.0))),
            _ => Err(DxfError::invalid(format!("{context} 缺少完整的 XY 坐标"))),
        }
    }
}

const COMMENT_CODE: i32 = 999;

struct DxfReader<'a> {
    lines: std::str::Lines<'a>,
    buffer: Option<(i32, String)>,
    line_number: usize,
}

impl<'a> DxfReader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            buffer: None,
            line_number: 0,
        }
    }

    /// 读取下一个组码对，注释（组码 999）在此直接跳过。
    fn next_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        if let Some(pair) = self.buffer.take() {
            return Ok(Some(pair));
        }

        loop {
            let code_line = match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    line
                }
                None => return Ok(None),
            };

            let value_line = match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    line
                }
                None => {
                    return Err(DxfError::invalid(format!(
                        "文件在第 {} 行结束，缺少与组码对应的值行",
                        self.line_number
                    )));
                }
            };

            let code = code_line.trim().parse::<i32>().map_err(|_| {
                DxfError::invalid(format!(
                    "第 {} 行的组码 \"{}\" 无法解析为整数",
                    self.line_number - 1,
                    code_line.trim()
                ))
            })?;
            if code == COMMENT_CODE {
                continue;
            }
            let value = value_line.trim_end_matches('\r').to_string();
            return Ok(Some((code, value)));
        }
    }

    /// 回退一个组码对。调用方只会在刚读出一对之后回退，缓冲区此时必为空。
    fn put_back(&mut self, pair: (i32, String)) {
        debug_assert!(self.buffer.is_none(), "DXF pair 被重复回退");
        self.buffer = Some(pair);
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn assign_coord(slot: &mut Option<f64>, raw: &str, context: &str) -> Result<(), DxfError> {
    if slot.is_some() {
        return Err(DxfError::invalid(format!("{context} 出现重复值")));
    }
    *slot = Some(parse_f64(raw, context)?);
    Ok(())
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

fn parse_i32(raw: &str, context: &str) -> Result<i32, DxfError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}
