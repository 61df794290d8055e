pub mod bounds;
pub mod build;
pub mod command;
pub mod render;
pub mod session;
pub mod summary;
pub mod view;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("invalid viewport size {width}x{height}")]
        InvalidViewport { width: f64, height: f64 },
        #[error("invalid command argument: {0}")]
        InvalidArgument(String),
    }
}

pub mod scene {
    use dxfview_core::shape::Shape;
    use tracing::debug;

    /// 常驻场景成员，启动时创建且从不移除。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum PersistentMember {
        AmbientLight { color: u32, intensity: f32 },
        AxisIndicator { size: f64 },
    }

    /// 当前文档的图形组，每次加载整体替换。
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ModelGroup {
        shapes: Vec<Shape>,
    }

    impl ModelGroup {
        #[inline]
        pub fn shapes(&self) -> &[Shape] {
            &self.shapes
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.shapes.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.shapes.is_empty()
        }
    }

    /// 场景内容分为两个固定槽位：常驻成员与瞬态模型组。
    #[derive(Debug)]
    pub struct SceneManager {
        persistent: [PersistentMember; 2],
        transient: Option<ModelGroup>,
    }

    impl SceneManager {
        pub fn new() -> Self {
            Self {
                persistent: [
                    PersistentMember::AmbientLight {
                        color: 0xFF_FF_FF,
                        intensity: 1.0,
                    },
                    PersistentMember::AxisIndicator { size: 50.0 },
                ],
                transient: None,
            }
        }

        #[inline]
        pub fn persistent(&self) -> &[PersistentMember] {
            &self.persistent
        }

        #[inline]
        pub fn transient(&self) -> Option<&ModelGroup> {
            self.transient.as_ref()
        }

        /// 当前瞬态图形；未加载过文档时为空切片。
        pub fn shapes(&self) -> &[Shape] {
            match &self.transient {
                Some(group) => group.shapes(),
                None => &[],
            }
        }

        /// 移除所有非常驻成员，可重复调用。
        pub fn clear(&mut self) {
            if let Some(group) = self.transient.take() {
                debug!(shapes = group.len(), "已清除模型组");
            }
        }

        /// 先清空，再把图形作为一个组加入。返回组内成员数，可以为 0。
        pub fn load(&mut self, shapes: Vec<Shape>) -> usize {
            self.clear();
            let group = ModelGroup { shapes };
            let count = group.len();
            self.transient = Some(group);
            count
        }
    }

    impl Default for SceneManager {
        fn default() -> Self {
            Self::new()
        }
    }

}
